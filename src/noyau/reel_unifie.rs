// src/noyau/reel_unifie.rs
//
// Réels unifiés : produit d'un rationnel borné (comparaisons exactes
// décidables) et d'un réel constructif évalué paresseusement, ce dernier
// étiqueté d'une forme symbolique dès qu'on sait la reconnaître. Quand un
// rationnel suffit, le facteur constructif vaut 1 ; un zéro connu est
// TOUJOURS porté par le facteur rationnel (jamais par le constructif).
//
// C'est l'étiquetage qui rend décidables beaucoup de comparaisons entre
// irrationnels ; sans lui, comparer deux valeurs égales divergerait. On
// suppose ici qu'on ne peut pas décider en général qu'un réel est
// exactement nul (vrai dès qu'on admet un réel constructif arbitraire en
// entrée) ; toute la mécanique de ce module vise à ne jamais avoir besoin
// de cette décision dans les cas reconnus.

use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::annulation::point_annulation;
use super::erreur::{Erreur, Precision, Resultat};
use super::fonctions::FonctionReelle;
use super::proprietes::{
    log_entier, propriete_sin_pi, propriete_tan_pi, puissance_commune, reel_depuis_propriete,
    Propriete,
};
use super::rationnel::{est_impair, signe, RationnelBorne, EXTRACTION_CARRE_MAX_OPT};
use super::reel::Reel;

// Tolérances de comparaison par défaut, en bits.
pub(crate) const TOLERANCE_INITIALE: Precision = -100; // comparaison grossière
const TOLERANCE_RELATIVE: Precision = -1000; // seulement dans est_comparable
pub(crate) const TOLERANCE_COMPARAISON: Precision = -3500; // absolue
// Grosso modo le nombre de zéros de tête qu'on accepte de traverser.
const TOLERANCE_ZERO: Precision = -5000;

// Exposant entier (en valeur absolue) jusqu'auquel on utilise l'algorithme
// récursif de puissance : il marche quel que soit le signe de la base et
// peut donner des résultats rationnels, mais devient lent au-delà.
const LIMITE_POW_RECURSIF: i64 = 1000;

// Limite correspondante en arithmétique rationnelle : ça échouera vite de
// toute façon, mais on s'épargne une récursion ridicule.
const LIMITE_POW_DUR_BITS: u64 = 1000;

// Au-delà de cette taille de résultat (en bits), on refuse lâchement de
// calculer, sous peine de manquer de mémoire désagréablement.
const LIMITE_BITS: i64 = 2_000_000;

// On ne garde pas trace des arguments de ln()/log() plus longs que ceci.
const BITS_ARG_LOG: u64 = 100;

// On ne tente même pas de simplifier des arguments de ln() plus longs.
const BITS_CANDIDAT_LOG: f64 = 2000.0;

// Petits entiers pour lesquels on reconnaît ln(m^n), simplifié en n·ln(m).
const PETITS_NON_PUISSANCES: [i64; 6] = [2, 3, 5, 6, 7, 10];

#[derive(Clone, Debug)]
pub struct ReelUnifie {
    pub(crate) rationnel: RationnelBorne,
    pub(crate) reel: Reel,
    pub(crate) propriete: Option<Propriete>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum GenreLog {
    Ln,
    Log,
}

/* ------------------------ construction ------------------------ */

impl ReelUnifie {
    fn brut(rationnel: RationnelBorne, reel: Reel, propriete: Option<Propriete>) -> Self {
        Self {
            rationnel,
            reel,
            propriete,
        }
    }

    // Reconnaît les quelques constantes partagées ; tout le reste passe
    // par des constructeurs qui posent la propriété explicitement.
    fn propriete_pour(reel: &Reel) -> Option<Propriete> {
        if reel.meme_noeud(&Reel::un()) {
            Some(Propriete::Un)
        } else if reel.meme_noeud(&Reel::pi()) {
            Some(Propriete::Pi)
        } else if reel.meme_noeud(&Reel::e()) {
            Some(Propriete::Exp(RationnelBorne::un()))
        } else if reel.meme_noeud(&Reel::ln10()) {
            Some(Propriete::Ln(RationnelBorne::dix()))
        } else {
            None
        }
    }

    pub fn depuis_reel(reel: Reel) -> Self {
        let propriete = Self::propriete_pour(&reel);
        Self::brut(RationnelBorne::un(), reel, propriete)
    }

    pub fn depuis_rationnel(r: RationnelBorne) -> Self {
        Self::brut(r, Reel::un(), Some(Propriete::Un))
    }

    pub fn depuis_bigint(n: BigInt) -> Self {
        Self::depuis_rationnel(RationnelBorne::depuis_entier(n))
    }

    pub fn depuis_i64(n: i64) -> Self {
        Self::depuis_rationnel(RationnelBorne::entier(n))
    }

    pub fn depuis_f64(x: f64) -> Resultat<Self> {
        Ok(Self::depuis_rationnel(RationnelBorne::depuis_f64(x)?))
    }

    // Propriété qui détermine le réel : on le reconstruit depuis elle.
    fn depuis_propriete(rationnel: RationnelBorne, p: Propriete) -> Resultat<Self> {
        debug_assert!(p.determine_reel());
        let reel = reel_depuis_propriete(&p)?.unwrap_or_else(Reel::un);
        Ok(Self::brut(rationnel, reel, Some(p)))
    }

    pub fn zero() -> Self {
        Self::depuis_rationnel(RationnelBorne::zero())
    }

    pub fn un() -> Self {
        Self::depuis_rationnel(RationnelBorne::un())
    }

    pub fn moins_un() -> Self {
        Self::depuis_rationnel(RationnelBorne::moins_un())
    }

    pub fn deux() -> Self {
        Self::depuis_rationnel(RationnelBorne::deux())
    }

    pub fn moitie() -> Self {
        Self::depuis_rationnel(RationnelBorne::moitie())
    }

    pub fn dix() -> Self {
        Self::depuis_rationnel(RationnelBorne::dix())
    }

    pub fn pi() -> Self {
        Self::brut(RationnelBorne::un(), Reel::pi(), Some(Propriete::Pi))
    }

    pub fn e() -> Self {
        Self::brut(
            RationnelBorne::un(),
            Reel::e(),
            Some(Propriete::Exp(RationnelBorne::un())),
        )
    }

    pub fn ln10() -> Self {
        Self::brut(
            RationnelBorne::un(),
            Reel::ln10(),
            Some(Propriete::Ln(RationnelBorne::dix())),
        )
    }

    /// π/180 : facteur de conversion degrés → radians.
    pub fn radians_par_degre() -> Self {
        Self::brut(
            RationnelBorne::fraction(1, 180),
            Reel::pi(),
            Some(Propriete::Pi),
        )
    }

    // Constantes internes : (√2)/2, (√3)/2, (√3)/3, √3, π/2, π/3, π/4, π/6.
    fn moitie_racine2() -> Self {
        Self::brut(
            RationnelBorne::moitie(),
            Reel::depuis_i64(2).racine_carree(),
            Some(Propriete::Racine(RationnelBorne::deux())),
        )
    }

    fn moitie_racine3() -> Self {
        Self::brut(
            RationnelBorne::moitie(),
            Reel::depuis_i64(3).racine_carree(),
            Some(Propriete::Racine(RationnelBorne::trois())),
        )
    }

    fn tiers_racine3() -> Self {
        Self::brut(
            RationnelBorne::tiers(),
            Reel::depuis_i64(3).racine_carree(),
            Some(Propriete::Racine(RationnelBorne::trois())),
        )
    }

    fn racine3() -> Self {
        Self::brut(
            RationnelBorne::un(),
            Reel::depuis_i64(3).racine_carree(),
            Some(Propriete::Racine(RationnelBorne::trois())),
        )
    }

    fn pi_sur(n: i64) -> Self {
        Self::brut(
            RationnelBorne::fraction(1, n),
            Reel::pi(),
            Some(Propriete::Pi),
        )
    }
}

/* ------------------------ accès ------------------------ */

impl ReelUnifie {
    /// Rationnel borné équivalent, s'il est connu ; None sinon.
    pub fn valeur_rationnelle_bornee(&self) -> Option<RationnelBorne> {
        if self.propriete_est_un() || self.rationnel.signum() == 0 {
            Some(self.rationnel.clone())
        } else {
            None
        }
    }

    /// Entier équivalent, s'il est connu.
    pub fn en_entier(&self) -> Option<BigInt> {
        self.valeur_rationnelle_bornee().and_then(|r| r.en_entier())
    }

    /// Réel constructif équivalent.
    pub fn valeur_reelle(&self) -> Reel {
        if self.rationnel.compare_a_un() == 0 {
            self.reel.clone()
        } else {
            self.rationnel.valeur_reelle().multiplier(&self.reel)
        }
    }

    /// Approximation double ; les rationnels sont arrondis au plus proche
    /// (égalité vers l'extérieur), le reste approximativement.
    pub fn valeur_f64(&self) -> Resultat<f64> {
        if self.propriete_est_un() {
            Ok(self.rationnel.valeur_f64())
        } else {
            self.valeur_reelle().valeur_f64()
        }
    }

    /// Approximation entière mise à l'échelle 2^p (voir Reel::approx).
    pub fn approx(&self, p: Precision) -> Resultat<BigInt> {
        self.valeur_reelle().approx(p)
    }

    fn propriete_est_un(&self) -> bool {
        matches!(self.propriete, Some(Propriete::Un))
    }

    fn propriete_est_pi(&self) -> bool {
        matches!(self.propriete, Some(Propriete::Pi))
    }

    fn arg_si(&self, cherche: fn(&Propriete) -> bool) -> Option<&RationnelBorne> {
        match &self.propriete {
            Some(p) if cherche(p) => p.arg(),
            _ => None,
        }
    }

    fn arg_racine(&self) -> Option<&RationnelBorne> {
        self.arg_si(|p| matches!(p, Propriete::Racine(_)))
    }

    fn arg_exp(&self) -> Option<&RationnelBorne> {
        self.arg_si(|p| matches!(p, Propriete::Exp(_)))
    }

    fn arg_ln(&self) -> Option<&RationnelBorne> {
        self.arg_si(|p| matches!(p, Propriete::Ln(_)))
    }

    fn arg_log(&self) -> Option<&RationnelBorne> {
        self.arg_si(|p| matches!(p, Propriete::Log(_)))
    }

    fn arg_sin_pi(&self) -> Option<&RationnelBorne> {
        self.arg_si(|p| matches!(p, Propriete::SinPi(_)))
    }

    fn arg_tan_pi(&self) -> Option<&RationnelBorne> {
        self.arg_si(|p| matches!(p, Propriete::TanPi(_)))
    }

    fn arg_asin(&self) -> Option<&RationnelBorne> {
        self.arg_si(|p| matches!(p, Propriete::Asin(_)))
    }

    fn arg_atan(&self) -> Option<&RationnelBorne> {
        self.arg_si(|p| matches!(p, Propriete::Atan(_)))
    }

    // Même facteur constructif ? Par partage de noeud, ou par égalité de
    // propriétés déterminantes (décision par valeur, jamais par identité
    // seule).
    fn meme_facteur_reel(&self, u: &ReelUnifie) -> bool {
        if self.reel.meme_noeud(&u.reel) {
            return true;
        }
        match (&self.propriete, &u.propriete) {
            (Some(p1), Some(p2)) => p1.determine_reel() && p1 == p2,
            _ => false,
        }
    }

    // Les deux propriétés sont-elles de même genre, décrivant une
    // constante ou une fonction strictement monotone ?
    fn meme_genre_monotone(&self, u: &ReelUnifie) -> bool {
        match (&self.propriete, &u.propriete) {
            (Some(p1), Some(p2)) => p1.meme_genre(p2) && p1.determine_reel(),
            _ => false,
        }
    }
}

/* ------------------------ prédicats de certitude ------------------------ */

impl ReelUnifie {
    pub fn definitivement_zero(&self) -> bool {
        // un facteur constructif connu nul aurait été représenté autrement
        self.rationnel.signum() == 0
    }

    /// Non-nullité décidable sans évaluation approchée ?
    pub fn definitivement_non_nul(&self) -> bool {
        self.rationnel.signum() != 0
            && self
                .propriete
                .as_ref()
                .is_some_and(|p| p.est_non_nul())
    }

    pub fn definitivement_un(&self) -> bool {
        self.propriete_est_un() && self.rationnel.est_un()
    }

    pub fn definitivement_rationnel(&self) -> bool {
        self.propriete_est_un() || self.rationnel.signum() == 0
    }

    pub fn definitivement_irrationnel(&self) -> bool {
        // correct pour Irrationnel ; les autres genres excluent
        // soigneusement les arguments qui décriraient un rationnel
        self.propriete
            .as_ref()
            .is_some_and(|p| !p.est_un())
    }

    pub fn definitivement_algebrique(&self) -> bool {
        self.propriete
            .as_ref()
            .is_some_and(|p| p.est_algebrique())
            || self.rationnel.signum() == 0
    }

    pub fn definitivement_transcendant(&self) -> bool {
        if self.definitivement_rationnel() {
            return false;
        }
        match &self.propriete {
            None => false,
            Some(p) => match p {
                Propriete::Un => false, // exclu par definitivement_rationnel
                Propriete::Pi => true,
                Propriete::Racine(_) => false,
                // arg > 1 : conséquence de Lindemann–Weierstrass. Si
                // ln(r) = a avec r rationnel et a algébrique, alors
                // r = e^a ; or pour a algébrique non nul, e^a est
                // transcendant.
                Propriete::Ln(_) => true,
                // Si c'est rationnel, n·ln(arg) = m·ln(10) avec n, m
                // entiers. Peut-on faire mieux ?
                Propriete::Log(_) => false,
                // arg ≠ 0 : application directe de Lindemann–Weierstrass.
                Propriete::Exp(_) => true,
                // toujours algébrique aux multiples rationnels de π
                Propriete::SinPi(_) | Propriete::TanPi(_) => false,
                // Si asin(r) = a avec r rationnel et a algébrique, alors
                // r = sin(a), ce qui par Lindemann–Weierstrass exige
                // a = 0, c'est-à-dire r = 0 — représentation qu'on
                // n'utilise pas. Argument analogue pour atan.
                Propriete::Asin(_) | Propriete::Atan(_) => true,
                Propriete::Irrationnel => false, // pas assez d'information
            },
        }
    }

    // L'argument d'une propriété Racine est-il connu minimal ?
    fn racine_irreductible(arg: &RationnelBorne) -> bool {
        let reduit = arg.reduire().den_positif();
        reduit.num.bits() <= 30
            && reduit.num.to_i64().map(i64::abs).unwrap_or(i64::MAX) <= EXTRACTION_CARRE_MAX_OPT
            && reduit.den.bits() <= 30
            && reduit.den.to_i64().map(i64::abs).unwrap_or(i64::MAX) <= EXTRACTION_CARRE_MAX_OPT
    }

    /// Nos deux facteurs constructifs sont-ils prouvés multiples
    /// irrationnels non nuls l'un de l'autre ? Si oui, leur comparaison ne
    /// peut pas diverger — sans borne de temps connue pour autant : deux
    /// valeurs minuscules restent impraticables à départager.
    pub fn independants(&self, u: &ReelUnifie) -> Resultat<bool> {
        let (p1, p2) = match (&self.propriete, &u.propriete) {
            (Some(p1), Some(p2)) => (p1, p2),
            _ => return Ok(false),
        };
        if p1 == p2 {
            return Ok(false);
        }
        // moitié des cas seulement : Un < Pi < Racine < Exp < Ln < …
        if p1.ordre() > p2.ordre() {
            return u.independants(self);
        }
        Ok(match p1 {
            Propriete::Un => u.definitivement_irrationnel(),
            // Savoir si π est multiple rationnel d'une exponentielle ou
            // d'un log semble ouvert. En étant braves, on répondrait vrai
            // en espérant une boucle infinie, qui prouverait un théorème
            // intéressant. Nous ne sommes pas braves.
            Propriete::Pi => matches!(p2, Propriete::Racine(_)),
            Propriete::Racine(arg1) => {
                if u.definitivement_transcendant() {
                    true
                } else if let Propriete::Racine(arg2) = p2 {
                    // l'argument n'est pas nécessairement minimal
                    Self::racine_irreductible(arg1)
                        && Self::racine_irreductible(arg2)
                        && p1 != p2
                } else {
                    false
                }
            }
            Propriete::Exp(arg1) => match p2 {
                // Lindemann–Weierstrass donne l'indépendance algébrique.
                Propriete::Exp(arg2) => arg1 != arg2,
                // Si e^a = c·ln(b), alors e^(e^a) = b^c : le membre droit
                // est multiple algébrique de e^0. Par Lindemann–Weierstrass
                // il faudrait e^a = 0, impossible.
                Propriete::Ln(_) => true,
                _ => u.definitivement_algebrique(),
            },
            Propriete::Ln(arg1) => match p2 {
                Propriete::Irrationnel => false, // pas assez d'information
                // Si ln(a) = c·ln(b) avec a, b, c rationnels, alors
                // a = b^c, soit a^c1 = b^c2 avec c1, c2 entiers, c non nul
                // puisque a > 1. Condition nécessaire : numérateurs et
                // dénominateurs ont séparément une puissance entière
                // commune.
                Propriete::Ln(arg2) => !puissance_commune(arg1, arg2)?,
                // Supposons ln(r) = a algébrique : e^a est rationnel, donc
                // par Lindemann–Weierstrass a = 0 et r = 1, exclu ici.
                // Tout algébrique est donc indépendant. Mieux pour Log ?
                _ => u.definitivement_algebrique(),
            },
            Propriete::Log(arg1) => {
                // le cas u rationnel aurait été vu dans l'autre sens
                if let Propriete::Log(arg2) = p2 {
                    // ln(a)/ln(10) = r·ln(b)/ln(10) ⇔ ln(a) = r·ln(b) :
                    // même algorithme que pour Ln.
                    !puissance_commune(arg1, arg2)?
                } else {
                    false
                }
            }
            // Toujours algébriques ; le cas u rationnel est déjà traité.
            Propriete::SinPi(_) | Propriete::TanPi(_) => u.definitivement_transcendant(),
            // Transcendant, comme argumenté plus haut.
            Propriete::Asin(_) => u.definitivement_algebrique(),
            // Le cas u rationnel est traité plus haut. Mieux ?
            Propriete::Atan(_) => false,
            Propriete::Irrationnel => false,
        })
    }
}

/* ------------------------ comparaison ------------------------ */

impl ReelUnifie {
    /// Majorant du nombre de zéros binaires entre le point et le premier
    /// bit significatif ; None si le rationnel et la propriété ne
    /// suffisent pas à le borner.
    pub fn zeros_binaires_en_tete(&self) -> Option<i32> {
        let borne_reel = self.propriete.as_ref()?.msb_borne()?;
        let bits_entiers = self.rationnel.bits_entiers()? as i32;
        if bits_entiers + borne_reel >= 3 {
            Some(0)
        } else {
            Some(-(bits_entiers + borne_reel) + 3)
        }
    }

    /// self et u sont-ils exactement comparables ? Vrai dès que la
    /// connaissance symbolique garantit une réponse décidable. L'usage
    /// d'une tolérance peut donner un faux "non", jamais un faux "oui".
    pub fn est_comparable(&self, u: &ReelUnifie) -> Resultat<bool> {
        // le test Un d'abord, pour accélérer le cas courant
        if self.meme_facteur_reel(u)
            && self.propriete.as_ref().is_some_and(|p| p.est_non_nul())
        {
            return Ok(true);
        }
        if self.rationnel.signum() == 0 && u.rationnel.signum() == 0 {
            return Ok(true);
        }
        if self.independants(u)? {
            // il faut aussi qu'un des opérandes soit non minuscule pour
            // que la comparaison soit praticable
            if self.zeros_binaires_en_tete().is_some_and(|z| z < -TOLERANCE_ZERO)
                || u.zeros_binaires_en_tete().is_some_and(|z| z < -TOLERANCE_ZERO)
                || self.valeur_reelle().signum_tol(TOLERANCE_INITIALE)? != 0
                || u.valeur_reelle().signum_tol(TOLERANCE_INITIALE)? != 0
                || self.valeur_reelle().signum_tol(TOLERANCE_ZERO)? != 0
                || u.valeur_reelle().signum_tol(TOLERANCE_ZERO)? != 0
            {
                return Ok(true);
            }
        }
        if self.meme_genre_monotone(u) {
            let racine = matches!(self.propriete, Some(Propriete::Racine(_)));
            if racine || self.rationnel == u.rationnel {
                return Ok(true);
            }
        }
        Ok(self
            .valeur_reelle()
            .comparer_rel(&u.valeur_reelle(), TOLERANCE_RELATIVE, TOLERANCE_COMPARAISON)?
            != 0)
    }

    /// +1, −1, ou 0 si l'égalité est SUE. Peut diverger si les valeurs
    /// sont égales sans être comparables.
    pub fn comparer(&self, u: &ReelUnifie) -> Resultat<i32> {
        if self.definitivement_zero() && u.definitivement_zero() {
            return Ok(0);
        }
        if self.meme_facteur_reel(u) {
            // peut diverger si le facteur constructif est nul
            let signum = self.reel.signum()?;
            return Ok(signum * self.rationnel.comparer(&u.rationnel));
        }
        if self.meme_genre_monotone(u) {
            let (p1, p2) = match (&self.propriete, &u.propriete) {
                (Some(p1), Some(p2)) => (p1, p2),
                _ => unreachable!(),
            };
            if self.rationnel == u.rationnel {
                // Le genre ne peut être ni Pi ni Un (meme_facteur_reel
                // aurait répondu), ni Irrationnel (exclu par le genre
                // monotone). Tous les autres sont des fonctions
                // strictement croissantes sur la plage admise : comparer
                // les arguments suffit.
                if let (Some(a1), Some(a2)) = (p1.arg(), p2.arg()) {
                    return Ok(self.rationnel.signum() * a1.comparer(a2));
                }
            }
            if let (Propriete::Racine(a1), Propriete::Racine(a2)) = (p1, p2) {
                // Comparer les carrés. L'exactitude est promise ici : on
                // force les multiplications à aboutir en laissant le
                // résultat dépasser les bornes de taille habituelles.
                let signum = self.rationnel.signum();
                let u_signum = u.rationnel.signum();
                if signum < u_signum {
                    return Ok(-1);
                }
                if signum > u_signum {
                    return Ok(1);
                }
                let carre = self
                    .rationnel
                    .multiplier_brut(&self.rationnel)
                    .multiplier_brut(a1);
                let u_carre = u
                    .rationnel
                    .multiplier_brut(&u.rationnel)
                    .multiplier_brut(a2);
                return Ok(signum * carre.comparer(&u_carre));
            }
        }
        self.valeur_reelle().comparer(&u.valeur_reelle()) // peut diverger aussi
    }

    /// Comme comparer(), mais peut répondre 0 si les deux valeurs sont à
    /// moins de 2^a l'une de l'autre sans être comparables.
    pub fn comparer_tol(&self, u: &ReelUnifie, a: Precision) -> Resultat<i32> {
        if self.est_comparable(u)? {
            self.comparer(u)
        } else {
            // essayer d'abord de trancher à précision plus faible
            let mien = self.valeur_reelle();
            let sien = u.valeur_reelle();
            let mut prec = TOLERANCE_INITIALE;
            while prec.saturating_mul(2) > a {
                let r = mien.comparer_tol(&sien, prec)?;
                if r != 0 {
                    return Ok(r);
                }
                point_annulation()?;
                prec *= 2;
            }
            mien.comparer_tol(&sien, a)
        }
    }

    /// comparer_tol(zero, a).
    pub fn signum_tol(&self, a: Precision) -> Resultat<i32> {
        self.comparer_tol(&Self::zero(), a)
    }

    /// comparer(zero) ; peut diverger sur un zéro non comparable.
    pub fn signum(&self) -> Resultat<i32> {
        self.comparer(&Self::zero())
    }

    /// Égalité approchée : peut répondre vrai à tort si les valeurs
    /// diffèrent de moins de 2^a sans être comparables.
    pub fn egal_approx(&self, u: &ReelUnifie, a: Precision) -> Resultat<bool> {
        if self.est_comparable(u)? {
            if self.independants(u)?
                && (self.rationnel.signum() != 0 || u.rationnel.signum() != 0)
            {
                // inutile d'évaluer : différents, même sans savoir lequel
                // est le plus grand
                return Ok(false);
            }
            return Ok(self.comparer(u)? == 0);
        }
        Ok(self.valeur_reelle().comparer_tol(&u.valeur_reelle(), a)? == 0)
    }

    /// Vrai si l'égalité est certaine ; faux dans tous les autres cas.
    pub fn definitivement_egal(&self, u: &ReelUnifie) -> Resultat<bool> {
        Ok(self.est_comparable(u)? && self.comparer(u)? == 0)
    }

    /// Vrai si l'inégalité est certaine sur la seule base symbolique,
    /// sans AUCUNE évaluation approchée.
    pub fn definitivement_different(&self, u: &ReelUnifie) -> Resultat<bool> {
        if self.rationnel.signum() == 0 {
            return Ok(u
                .propriete
                .as_ref()
                .is_some_and(|p| p.est_non_nul())
                && u.rationnel.signum() != 0);
        }
        if u.rationnel.signum() == 0 {
            return Ok(self
                .propriete
                .as_ref()
                .is_some_and(|p| p.est_non_nul())
                && self.rationnel.signum() != 0);
        }
        if self.propriete.is_none() || u.propriete.is_none() {
            return Ok(false);
        }
        if self.independants(u)? {
            return Ok(self.rationnel.signum() != 0 || u.rationnel.signum() != 0);
        }
        if self.meme_facteur_reel(u)
            && self.propriete.as_ref().is_some_and(|p| p.est_non_nul())
        {
            return Ok(self.rationnel != u.rationnel);
        }
        Ok(false)
    }
}

/* ------------------------ arithmétique ------------------------ */

impl ReelUnifie {
    /// ln ou log d'un rationnel positif ≠ 1, sous la meilleure forme
    /// symbolique disponible.
    fn representation_log(genre: GenreLog, arg: &RationnelBorne) -> Resultat<ReelUnifie> {
        if arg.compare_a_un() < 0 {
            // Normaliser vers un argument > 1 : on multiplie les chances
            // de retrouver le même argument ailleurs, et c'est plus propre
            // à afficher.
            return Ok(Self::representation_log(genre, &arg.inverse()?)?.negation());
        }
        if let Some(entier) = arg.en_entier() {
            if let Some(petit) = Self::log_petite_puissance(genre, &entier)? {
                return Ok(petit);
            }
        }
        if arg.longueur_bits() > BITS_ARG_LOG {
            let ln_reel = arg.valeur_reelle().ln()?;
            return Ok(match genre {
                GenreLog::Ln => Self::depuis_reel(ln_reel),
                GenreLog::Log => Self::depuis_reel(ln_reel.diviser(&Reel::ln10())),
            });
        }
        let propriete = match genre {
            GenreLog::Ln => Propriete::ln(arg.clone()),
            GenreLog::Log => Propriete::log(arg.clone()),
        };
        Self::depuis_propriete(RationnelBorne::un(), propriete)
    }

    // Reconnaît n = m^k pour un petit m, et rend k·lg(m) ; None sinon.
    fn log_petite_puissance(genre: GenreLog, n: &BigInt) -> Resultat<Option<ReelUnifie>> {
        for m in PETITS_NON_PUISSANCES {
            let k = log_entier(n, m as i32)?;
            if k == 0 {
                continue;
            }
            if genre == GenreLog::Log && m == 10 {
                return Ok(Some(Self::depuis_i64(k)));
            }
            let lg_m = match genre {
                GenreLog::Ln => Reel::depuis_i64(m).ln()?,
                GenreLog::Log => Reel::depuis_i64(m).ln()?.diviser(&Reel::ln10()),
            };
            let propriete = match genre {
                GenreLog::Ln => Propriete::ln(RationnelBorne::entier(m)),
                GenreLog::Log => Propriete::log(RationnelBorne::entier(m)),
            };
            return Ok(Some(Self::brut(
                RationnelBorne::entier(k),
                lg_m,
                Some(propriete),
            )));
        }
        Ok(None)
    }

    pub fn ajouter(&self, u: &ReelUnifie) -> Resultat<ReelUnifie> {
        if self.meme_facteur_reel(u) {
            if let Some(somme) = self.rationnel.ajouter(&u.rationnel) {
                return Ok(Self::brut(somme, self.reel.clone(), self.propriete.clone()));
            }
        }
        if self.definitivement_zero() {
            // ne pas créer de nouveau facteur constructif, même s'ils ne
            // coïncident pas actuellement
            return Ok(u.clone());
        }
        if u.definitivement_zero() {
            return Ok(self.clone());
        }
        // a·ln(b) + c·ln(d) = ln(b^a · d^c), idem en log : si l'argument
        // résultant reste compact, calculer la somme sous cette forme
        // préserve la représentation symbolique.
        if let (Some(p1), Some(p2)) = (&self.propriete, &u.propriete) {
            let genre = match (p1, p2) {
                (Propriete::Ln(_), Propriete::Ln(_)) => Some(GenreLog::Ln),
                (Propriete::Log(_), Propriete::Log(_)) => Some(GenreLog::Log),
                _ => None,
            };
            if let (Some(genre), Some(arg1), Some(arg2)) = (genre, p1.arg(), p2.arg()) {
                let rat_entier = self.rationnel.en_entier();
                let u_rat_entier = u.rationnel.en_entier();
                if let (Some(a), Some(c)) = (rat_entier, u_rat_entier) {
                    // estimer la taille de l'argument résultant
                    let taille_estimee = a.to_f64().unwrap_or(f64::INFINITY).abs()
                        * arg1.longueur_bits() as f64
                        + c.to_f64().unwrap_or(f64::INFINITY).abs()
                            * arg2.longueur_bits() as f64;
                    if taille_estimee <= BITS_CANDIDAT_LOG {
                        let terme1 = RationnelBorne::puissance(arg1, &self.rationnel)?;
                        let terme2 = RationnelBorne::puissance(arg2, &u.rationnel)?;
                        if let (Some(t1), Some(t2)) = (terme1, terme2) {
                            if let Some(nouvel_arg) = t1.multiplier(&t2) {
                                return Self::representation_log(genre, &nouvel_arg);
                            }
                        }
                    }
                }
            }
        }
        // Aucun des deux rationnels n'est nul ici. On peut encore conclure
        // à l'irrationalité si les deux arguments sont indépendants — mais
        // c'est contre-productif pour des ordres de grandeur très
        // disparates : on SAIT que 1 + e^(−e^10000) est irrationnel, sans
        // vouloir l'évaluer assez pour le distinguer de 1. On ne suit donc
        // rien dès qu'un argument peut être ridiculement petit.
        let propriete_resultat = if self.independants(u)?
            && self
                .zeros_binaires_en_tete()
                .is_some_and(|z| z < -TOLERANCE_COMPARAISON)
            && u.zeros_binaires_en_tete()
                .is_some_and(|z| z < -TOLERANCE_COMPARAISON)
        {
            Some(Propriete::Irrationnel)
        } else {
            None
        };
        Ok(Self::brut(
            RationnelBorne::un(),
            self.valeur_reelle().ajouter(&u.valeur_reelle()),
            propriete_resultat,
        ))
    }

    pub fn negation(&self) -> ReelUnifie {
        Self::brut(
            self.rationnel.negatif(),
            self.reel.clone(),
            self.propriete.clone(),
        )
    }

    pub fn soustraire(&self, u: &ReelUnifie) -> Resultat<ReelUnifie> {
        self.ajouter(&u.negation())
    }

    /// √(x·y) pour x, y arguments de propriétés Racine.
    fn produit_de_racines(x: &RationnelBorne, y: &RationnelBorne) -> Resultat<ReelUnifie> {
        if x == y {
            return Ok(Self::depuis_rationnel(x.clone()));
        }
        match x.multiplier(y) {
            Some(produit) => {
                let produit = produit.reduire();
                if produit.signum() == 0 {
                    return Ok(Self::zero());
                }
                let (carre, reste) = produit.extraire_carre_reduit()?;
                Ok(Self::brut(
                    carre,
                    reste.valeur_reelle().racine_carree(),
                    Some(Propriete::racine(reste)),
                ))
            }
            None => Ok(Self::depuis_reel(
                x.valeur_reelle().multiplier(&y.valeur_reelle()).racine_carree(),
            )),
        }
    }

    pub fn multiplier(&self, u: &ReelUnifie) -> Resultat<ReelUnifie> {
        // préserver un facteur constructif préexistant quand on peut
        if self.propriete_est_un() {
            if let Some(produit) = self.rationnel.multiplier(&u.rationnel) {
                return Ok(Self::brut(produit, u.reel.clone(), u.propriete.clone()));
            }
        }
        if u.propriete_est_un() {
            if let Some(produit) = self.rationnel.multiplier(&u.rationnel) {
                return Ok(Self::brut(produit, self.reel.clone(), self.propriete.clone()));
            }
        }
        if self.definitivement_zero() || u.definitivement_zero() {
            return Ok(Self::zero());
        }
        let produit_rationnel = self.rationnel.multiplier(&u.rationnel);
        let mut propriete_resultat = None;
        if let (Some(p1), Some(p2)) = (&self.propriete, &u.propriete) {
            if let (Propriete::Racine(a1), Propriete::Racine(a2)) = (p1, p2) {
                let partie_racine = Self::produit_de_racines(a1, a2)?;
                let rationnel_final = produit_rationnel
                    .as_ref()
                    .and_then(|r| r.multiplier(&partie_racine.rationnel));
                if let Some(r) = rationnel_final {
                    return Ok(Self::brut(r, partie_racine.reel, partie_racine.propriete));
                }
            }
            if let (Propriete::Exp(a1), Propriete::Exp(a2)) = (p1, p2) {
                // exp(a)·exp(b) = exp(a+b) ; seulement pour la propriété,
                // les facteurs constructifs pouvant déjà être évalués
                if let Some(somme) = a1.ajouter(a2) {
                    propriete_resultat = Some(Propriete::exp(somme));
                }
            }
        }
        // un peu moins cher composante par composante
        if let Some(r) = produit_rationnel {
            return Ok(Self::brut(
                r,
                self.reel.multiplier(&u.reel),
                propriete_resultat,
            ));
        }
        // propriété invalide pour ce calcul-ci ; on l'abandonne
        Ok(Self::depuis_reel(
            self.valeur_reelle().multiplier(&u.valeur_reelle()),
        ))
    }

    /// Inverse multiplicatif.
    pub fn inverse(&self) -> Resultat<ReelUnifie> {
        if self.definitivement_zero() {
            return Err(Erreur::DivisionParZero);
        }
        if self.propriete_est_un() {
            return Ok(Self::depuis_rationnel(self.rationnel.inverse()?));
        }
        if let Some(carre) = self.arg_racine() {
            if carre.en_entier().is_some() {
                // privilégier les racines d'entiers : 1/(r·√n) = (√n)/(r·n)
                if let Some(produit) = self.rationnel.multiplier(carre) {
                    let inverse = produit.inverse()?;
                    return Ok(Self::brut(
                        inverse,
                        self.reel.clone(),
                        self.propriete.clone(),
                    ));
                }
            }
        }
        let nouvelle_propriete = match &self.propriete {
            Some(Propriete::Exp(a)) => Some(Propriete::exp(a.negatif())),
            _ if self.definitivement_irrationnel() => Some(Propriete::Irrationnel),
            _ => None,
        };
        Ok(Self::brut(
            self.rationnel.inverse()?,
            self.reel.inverse(),
            nouvelle_propriete,
        ))
    }

    pub fn diviser(&self, u: &ReelUnifie) -> Resultat<ReelUnifie> {
        if self.meme_facteur_reel(u) {
            if u.definitivement_zero() {
                return Err(Erreur::DivisionParZero);
            }
            if let Some(quotient) = self.rationnel.diviser(&u.rationnel)? {
                return Ok(Self::depuis_rationnel(quotient));
            }
        }
        // ramener ln(x)/ln(10) à log(x), pour garder une forme symbolique
        if let Some(arg_ln) = self.arg_ln() {
            if let Some(u_arg_ln) = u.arg_ln() {
                if u_arg_ln == &RationnelBorne::dix() {
                    if let Some(quotient) = self.rationnel.diviser(&u.rationnel)? {
                        return Self::depuis_propriete(quotient, Propriete::log(arg_ln.clone()));
                    }
                }
            }
        }
        self.multiplier(&u.inverse()?)
    }

    /// Racine carrée. Peut rendre une valeur sans propriété, plutôt qu'un
    /// rationnel connu, même quand le résultat est rationnel.
    pub fn racine_carree(&self) -> Resultat<ReelUnifie> {
        if self.signum_tol(TOLERANCE_COMPARAISON)? < 0 {
            return Err(Erreur::Domaine("racine carrée d'un négatif"));
        }
        if self.definitivement_zero() {
            return Ok(Self::zero());
        }
        if self.propriete_est_un() {
            let reduit = self.rationnel.reduire();
            if reduit.extraction_carre_reussira() {
                // éviter de fabriquer une propriété Racine pour un rationnel
                let (carre, reste) = reduit.extraire_carre_reduit()?;
                let propriete = if reste.compare_a_un() == 0 {
                    Propriete::Un
                } else {
                    Propriete::racine(reste.clone())
                };
                return Ok(Self::brut(
                    carre,
                    reste.valeur_reelle().racine_carree(),
                    Some(propriete),
                ));
            } // sinon ne rien suivre : on ignore si c'est rationnel
        }
        // si c'est exp(a), le résultat est exp(a/2) : le noter
        let mut nouvelle_propriete = None;
        if let Some(arg_exp) = self.arg_exp() {
            if let Some(moitie) = arg_exp.diviser(&RationnelBorne::deux())? {
                nouvelle_propriete = Some(Propriete::exp(moitie));
            }
        }
        Ok(Self::brut(
            RationnelBorne::un(),
            self.valeur_reelle().racine_carree(),
            nouvelle_propriete,
        ))
    }
}

/* ------------------------ trigonométrie ------------------------ */

impl ReelUnifie {
    /// (self mod 2π)/(π/6) sous forme d'entier de [0, 24), si c'est
    /// facilement accessible.
    fn douziemes_de_pi(&self) -> Option<BigInt> {
        if self.definitivement_zero() {
            return Some(BigInt::zero());
        }
        if self.propriete_est_pi() {
            let quotient = self
                .rationnel
                .multiplier(&RationnelBorne::douze())
                .and_then(|r| r.en_entier())?;
            let vingt_quatre = BigInt::from(24);
            let m = ((&quotient % &vingt_quatre) + &vingt_quatre) % &vingt_quatre;
            return Some(m);
        }
        None
    }

    // sin(n·π/12) quand il a une écriture facile ; n dans [0, 24).
    fn sin_douziemes(n: i32) -> Option<ReelUnifie> {
        if n >= 12 {
            return Self::sin_douziemes(n - 12).map(|r| r.negation());
        }
        match n {
            0 => Some(Self::zero()),
            2 => Some(Self::moitie()),          // 30°
            3 => Some(Self::moitie_racine2()),  // 45°
            4 => Some(Self::moitie_racine3()),  // 60°
            6 => Some(Self::un()),
            8 => Some(Self::moitie_racine3()),
            9 => Some(Self::moitie_racine2()),
            10 => Some(Self::moitie()),
            _ => None,
        }
    }

    fn cos_douziemes(n: i32) -> Option<ReelUnifie> {
        let mut arg_sin = n + 6;
        if arg_sin >= 24 {
            arg_sin -= 24;
        }
        Self::sin_douziemes(arg_sin)
    }

    pub fn sinus(&self) -> Resultat<ReelUnifie> {
        if let Some(d) = self.douziemes_de_pi() {
            if let Some(r) = d.to_i32().and_then(Self::sin_douziemes) {
                return Ok(r);
            }
        }
        if self.propriete_est_pi() {
            if let Some((propriete, negatif)) = propriete_sin_pi(&self.rationnel) {
                let facteur = if negatif {
                    RationnelBorne::moins_un()
                } else {
                    RationnelBorne::un()
                };
                return Self::depuis_propriete(facteur, propriete);
            }
        }
        if let Some(arg) = self.arg_asin() {
            if self.rationnel.compare_a_un() == 0 {
                return Ok(Self::depuis_rationnel(arg.clone()));
            }
        }
        let nouvelle_propriete = if self.definitivement_algebrique() && self.definitivement_non_nul()
        {
            // transcendant par Lindemann–Weierstrass, donc irrationnel
            Some(Propriete::Irrationnel)
        } else {
            None
        };
        Ok(Self::brut(
            RationnelBorne::un(),
            self.valeur_reelle().sin()?,
            nouvelle_propriete,
        ))
    }

    // Copie de l'argument marquée au moins irrationnelle.
    fn marquer_irrationnel(u: ReelUnifie) -> ReelUnifie {
        if u.propriete.is_none() {
            Self::brut(u.rationnel, u.reel, Some(Propriete::Irrationnel))
        } else {
            u
        }
    }

    pub fn cosinus(&self) -> Resultat<ReelUnifie> {
        let decale = self.ajouter(&Self::pi_sur(2))?.sinus()?;
        if self.definitivement_algebrique() && self.definitivement_non_nul() {
            Ok(Self::marquer_irrationnel(decale))
        } else {
            Ok(decale)
        }
    }

    pub fn tangente(&self) -> Resultat<ReelUnifie> {
        if let Some(d) = self.douziemes_de_pi() {
            let i = d.to_i32().unwrap_or(-1);
            if i == 6 || i == 18 {
                return Err(Erreur::Domaine("tangente non définie"));
            }
            if i >= 0 {
                let haut = Self::sin_douziemes(i);
                let bas = Self::cos_douziemes(i);
                if let (Some(haut), Some(bas)) = (haut, bas) {
                    return haut.diviser(&bas);
                }
            }
        }
        if self.propriete_est_pi() {
            if let Some((propriete, negatif)) = propriete_tan_pi(&self.rationnel) {
                let facteur = if negatif {
                    RationnelBorne::moins_un()
                } else {
                    RationnelBorne::un()
                };
                return Self::depuis_propriete(facteur, propriete);
            }
        }
        if let Some(arg) = self.arg_atan() {
            if self.rationnel.compare_a_un() == 0 {
                return Ok(Self::depuis_rationnel(arg.clone()));
            }
        }
        let nouvelle_propriete = if self.definitivement_algebrique() && self.definitivement_non_nul()
        {
            Some(Propriete::Irrationnel)
        } else {
            None
        };
        Ok(Self::brut(
            RationnelBorne::un(),
            FonctionReelle::tangente().appliquer(&self.valeur_reelle())?,
            nouvelle_propriete,
        ))
    }

    // Erreur si l'argument est franchement hors domaine pour asin/acos.
    fn verifier_domaine_asin(&self) -> Resultat<()> {
        if self.est_comparable(&Self::un())?
            && (self.comparer(&Self::un())? > 0 || self.comparer(&Self::moins_un())? < 0)
        {
            return Err(Erreur::Domaine("argument de trigonométrie inverse hors de [-1, 1]"));
        }
        Ok(())
    }

    /// asin(n/2), n entre −2 et 2.
    fn asin_moities(n: i32) -> Resultat<ReelUnifie> {
        if n < 0 {
            return Ok(Self::asin_moities(-n)?.negation());
        }
        match n {
            0 => Ok(Self::zero()),
            1 => Ok(Self::brut(
                RationnelBorne::sixieme(),
                Reel::pi(),
                Some(Propriete::Pi),
            )),
            2 => Ok(Self::pi_sur(2)),
            _ => Err(Erreur::Domaine("argument de trigonométrie inverse hors de [-1, 1]")),
        }
    }

    pub fn arcsinus(&self) -> Resultat<ReelUnifie> {
        self.verifier_domaine_asin()?;
        if let Some(moities) = self.multiplier(&Self::deux())?.en_entier() {
            return Self::asin_moities(moities.to_i32().unwrap_or(i32::MAX));
        }
        if self.comparer_tol(&Self::zero(), -10)? < 0 {
            return Ok(self.negation().arcsinus()?.negation());
        }
        if self.definitivement_egal(&Self::moitie_racine2())? {
            return Ok(Self::pi_sur(4));
        }
        if self.definitivement_egal(&Self::moitie_racine3())? {
            return Ok(Self::pi_sur(3));
        }
        if let Some(arg) = self.arg_sin_pi() {
            if self.rationnel.compare_a_un() == 0 {
                return Ok(Self::brut(arg.clone(), Reel::pi(), Some(Propriete::Pi)));
            }
            if self.rationnel.comparer(&RationnelBorne::moins_un()) == 0 {
                return Ok(Self::brut(
                    arg.negatif(),
                    Reel::pi(),
                    Some(Propriete::Pi),
                ));
            }
        }
        if self.propriete_est_un() {
            debug_assert!(self.rationnel.signum() > 0);
            return Self::depuis_propriete(
                RationnelBorne::un(),
                Propriete::asin(self.rationnel.clone()),
            );
        }
        Ok(Self::depuis_reel(self.valeur_reelle().asin()?))
    }

    pub fn arccosinus(&self) -> Resultat<ReelUnifie> {
        Self::pi_sur(2).soustraire(&self.arcsinus()?)
    }

    pub fn arctangente(&self) -> Resultat<ReelUnifie> {
        if self.comparer_tol(&Self::zero(), -10)? < 0 {
            return Ok(self.negation().arctangente()?.negation());
        }
        if let Some(entier) = self.en_entier() {
            if entier <= BigInt::one() {
                // les seuls cas rationnels, semble-t-il
                return match entier.to_i32() {
                    Some(0) => Ok(Self::zero()),
                    Some(1) => Ok(Self::pi_sur(4)),
                    _ => Err(Erreur::Domaine("arctangente : entier inattendu")),
                };
            }
        }
        if self.definitivement_egal(&Self::tiers_racine3())? {
            return Ok(Self::pi_sur(6));
        }
        if self.definitivement_egal(&Self::racine3())? {
            return Ok(Self::pi_sur(3));
        }
        if let Some(arg) = self.arg_tan_pi() {
            if self.rationnel.compare_a_un() == 0 {
                return Ok(Self::brut(arg.clone(), Reel::pi(), Some(Propriete::Pi)));
            }
            if self.rationnel.comparer(&RationnelBorne::moins_un()) == 0 {
                return Ok(Self::brut(
                    arg.negatif(),
                    Reel::pi(),
                    Some(Propriete::Pi),
                ));
            }
        }
        if self.propriete_est_un() {
            debug_assert!(self.rationnel.signum() > 0);
            return Self::depuis_propriete(
                RationnelBorne::un(),
                Propriete::atan(self.rationnel.clone()),
            );
        }
        Ok(Self::depuis_reel(
            FonctionReelle::arctangente().appliquer(&self.valeur_reelle())?,
        ))
    }
}

/* ------------------------ puissances ------------------------ */

impl ReelUnifie {
    // Puissance entière d'un réel constructif, algorithme récursif
    // standard. exp > 0.
    fn pow_recursif(base: &Reel, exp: &BigInt) -> Resultat<Reel> {
        if exp.is_one() {
            return Ok(base.clone());
        }
        if est_impair(exp) {
            return Ok(base.multiplier(&Self::pow_recursif(base, &(exp - 1))?));
        }
        let moitie = Self::pow_recursif(base, &(exp >> 1usize))?;
        point_annulation()?;
        Ok(moitie.multiplier(&moitie))
    }

    // Puissance entière via exp/ln quand c'est sûr, récursif sinon.
    // exp est non nul.
    fn puissance_exp_ln(&self, exp: &BigInt) -> Resultat<ReelUnifie> {
        let signum = self.signum_tol(TOLERANCE_COMPARAISON)?;
        if signum > 0 {
            // le log est sûr ; évite une récursion profonde pour des
            // exposants énormes, qui peuvent avoir un sens ici
            return Ok(Self::depuis_reel(
                self.valeur_reelle()
                    .ln()?
                    .multiplier(&Reel::depuis_entier(exp.clone()))
                    .exp()?,
            ));
        }
        if signum < 0 {
            let mut resultat = self
                .valeur_reelle()
                .negation()
                .ln()?
                .multiplier(&Reel::depuis_entier(exp.clone()))
                .exp()?;
            if est_impair(exp) {
                resultat = resultat.negation();
            }
            return Ok(Self::depuis_reel(resultat));
        }
        // base de signe inconnu, exposant entier : calcul récursif
        if signe(exp) < 0 {
            // possiblement très coûteux si |exp| est grand
            Ok(Self::depuis_reel(
                Self::pow_recursif(&self.valeur_reelle(), &-exp)?.inverse(),
            ))
        } else {
            Ok(Self::depuis_reel(Self::pow_recursif(
                &self.valeur_reelle(),
                exp,
            )?))
        }
    }

    // Puissance entière. Récursion environ aussi profonde que la taille
    // de l'exposant en bits.
    fn puissance_entiere(&self, exp: &BigInt) -> Resultat<ReelUnifie> {
        if exp.is_one() {
            return Ok(self.clone());
        }
        let signe_exp = signe(exp);
        if signe_exp == 0 {
            // 0^0 d'une base CONNUE nulle vaut 1 par convention ; le cas
            // douteux (nullité résolue par évaluation) est traité dans
            // puissance().
            if self.definitivement_zero() {
                return Ok(Self::un());
            }
            // peut diverger si la base est un zéro non évident
            if self.signum()? != 0 {
                return Ok(Self::un());
            }
            return Err(Erreur::ZeroPuissanceZero);
        }
        if self.definitivement_zero() && signe_exp < 0 {
            return Err(Erreur::Domaine("puissance négative de zéro"));
        }
        let exp_abs = exp.abs();
        if self.propriete_est_un() {
            let longueur_resultat =
                exp.to_f64().unwrap_or(f64::INFINITY) * self.rationnel.log2_approx_abs();
            // les deux facteurs peuvent être négatifs ; cela implique
            // quand même une réponse énorme
            if longueur_resultat > LIMITE_BITS as f64 {
                return Err(Erreur::TropGrand("résultat de puissance"));
            }
            if exp_abs.bits() <= LIMITE_POW_DUR_BITS {
                // on compte sur l'échec de l'arithmétique rationnelle pour
                // les exposants qui seraient trop chers
                if let Some(rationnel) = self.rationnel.puissance_entiere(exp)? {
                    return Ok(Self::depuis_rationnel(rationnel));
                }
            }
        }
        if exp_abs > BigInt::from(LIMITE_POW_RECURSIF) {
            return self.puissance_exp_ln(exp);
        }
        if let Some(carre) = self.arg_racine().cloned() {
            // calculer les puissances en réels unifiés, pour garder les
            // contrôles de taille ci-dessus
            let facteur1 = Self::depuis_rationnel(self.rationnel.clone()).puissance_entiere(exp)?;
            let carre_unifie = Self::depuis_rationnel(carre);
            let facteur2 = carre_unifie.puissance_entiere(&(exp >> 1usize))?;
            let produit = facteur1.multiplier(&facteur2)?;
            return if est_impair(exp) {
                // exposant impair : multiplier par la racine restante
                produit.multiplier(&carre_unifie.racine_carree()?)
            } else {
                Ok(produit)
            };
        }
        self.puissance_exp_ln(exp)
    }

    /// self^exposant. Vraiment bien défini seulement pour une base
    /// positive, 0^x n'étant pas continu en zéro. (0^0 = 1 comme ε^0,
    /// mais 0^ε = 0.) On fait au mieux quand on reconnaît ces cas.
    pub fn puissance(&self, exposant: &ReelUnifie) -> Resultat<ReelUnifie> {
        if let Some(p) = &self.propriete {
            if let Propriete::Exp(a) = p {
                if a.compare_a_un() == 0 {
                    // base r·e
                    if self.rationnel.est_un() {
                        return exposant.exp();
                    }
                    let partie_rationnelle =
                        Self::depuis_rationnel(self.rationnel.clone()).puissance(exposant)?;
                    return exposant.exp()?.multiplier(&partie_rationnelle);
                }
            }
            if p.est_un() && self.rationnel.comparer(&RationnelBorne::dix()) == 0 {
                if let Some(arg_log) = exposant.arg_log() {
                    // 10^(r·log(b)) = b^r
                    return Self::depuis_rationnel(arg_log.clone())
                        .puissance(&Self::depuis_rationnel(exposant.rationnel.clone()));
                }
            }
        }
        let signum = self.signum_tol(TOLERANCE_COMPARAISON)?;
        let exposant_rationnel = exposant.valeur_rationnelle_bornee();
        let mut irrationalite_connue = false;
        if let Some(exp_rat) = &exposant_rationnel {
            let reduit = exp_rat.reduire().den_positif();
            if reduit.den.is_one() {
                return self.puissance_entiere(&reduit.num);
            }
            // Les deux arguments sont rationnels : chercher une réponse
            // rationnelle exacte. On refuse explicitement une base
            // négative, même quand cela aurait un sens comme (−8)^(1/3) —
            // probablement faux pour des racines cubiques, mais on ne
            // saurait de toute façon rien produire d'utile pour
            // (−8)^(1/3 calculé sans être reconnu tel).
            if signum >= 0 && self.propriete_est_un() && reduit.den.bits() <= 30 {
                let den = reduit.den.to_i32().unwrap_or(i32::MAX);
                // ne pas passer par RationnelBorne::puissance, qui
                // court-circuiterait les contrôles ci-dessus
                match RationnelBorne::racine_n(&self.rationnel, den)? {
                    Some(racine) => {
                        return Self::depuis_rationnel(racine).puissance_entiere(&reduit.num)
                    }
                    None => {
                        // la racine est irrationnelle ; l'élever à une
                        // puissance première avec den n'y changera rien
                        irrationalite_connue = true;
                    }
                }
            }
            // le cas racine carrée explicitement, le résultat pouvant
            // s'écrire comme multiple entier d'une petite racine
            if reduit.den == BigInt::from(2) {
                return self.puissance_entiere(&reduit.num)?.racine_carree();
            }
        }
        // un exposant connu nul aurait été traité ci-dessus
        if signum == 0 && self.definitivement_zero() {
            // calculer le signe de l'exposant, au risque de diverger
            let signe_exposant = exposant.signum()?;
            return match signe_exposant {
                s if s > 0 => Ok(Self::zero()),
                s if s < 0 => Err(Erreur::Domaine("puissance négative de zéro")),
                // nullité de la base résolue par évaluation tolérante :
                // signalée distinctement
                _ => Err(Erreur::ZeroPuissanceZero),
            };
        }
        if signum < 0 {
            return Err(Erreur::Domaine(
                "base négative avec exposant non entier",
            ));
        }
        let resultat_reel = self
            .valeur_reelle()
            .ln()?
            .multiplier(&exposant.valeur_reelle())
            .exp()?;
        if irrationalite_connue {
            Ok(Self::brut(
                RationnelBorne::un(),
                resultat_reel,
                Some(Propriete::Irrationnel),
            ))
        } else {
            Ok(Self::depuis_reel(resultat_reel))
        }
    }
}

/* ------------------------ exp / ln / log ------------------------ */

impl ReelUnifie {
    pub fn exp(&self) -> Resultat<ReelUnifie> {
        if self.definitivement_egal(&Self::zero())? {
            return Ok(Self::un());
        }
        if self.definitivement_egal(&Self::un())? {
            // évite des calculs redondants, et garantit que toutes les
            // occurrences se reconnaissent égales
            return Ok(Self::e());
        }
        if let Some(arg_ln) = self.arg_ln() {
            // exp(r·ln(b)) = b^r, exactement quand r est entier ou
            // demi-entier
            let exposant = if self.rationnel.en_entier().is_some() {
                Some((self.rationnel.clone(), false))
            } else {
                // chercher un multiple de un demi
                self.rationnel
                    .multiplier(&RationnelBorne::deux())
                    .map(|double| (double, true))
            };
            if let Some((exposant, besoin_racine)) = exposant {
                if let Some(rationnel) = RationnelBorne::puissance(arg_ln, &exposant)? {
                    let resultat = Self::depuis_rationnel(rationnel);
                    return if besoin_racine {
                        resultat.racine_carree()
                    } else {
                        Ok(resultat)
                    };
                }
            }
        }
        if self.comparer_tol(&Self::depuis_i64(LIMITE_BITS), 0)? > 0 {
            return Err(Erreur::TropGrand("argument d'exponentielle"));
        }
        let nouvelle_propriete = if self.propriete_est_un() {
            Some(Propriete::exp(self.rationnel.clone()))
        } else {
            None
        };
        Ok(Self::brut(
            RationnelBorne::un(),
            self.valeur_reelle().exp()?,
            nouvelle_propriete,
        ))
    }

    pub fn ln(&self) -> Resultat<ReelUnifie> {
        if let Some(arg_exp) = self.arg_exp() {
            // ln(r·e^a) = ln(r) + a
            let arg = Self::depuis_rationnel(arg_exp.clone());
            return Self::depuis_rationnel(self.rationnel.clone()).ln()?.ajouter(&arg);
        }
        let signum = self.signum_tol(TOLERANCE_COMPARAISON)?;
        if signum < 0 {
            return Err(Erreur::Domaine("logarithme d'un négatif"));
        }
        if self.est_comparable(&Self::zero())? {
            if signum == 0 {
                return Err(Erreur::Domaine("logarithme de zéro"));
            }
            let compare_un = self.comparer_tol(&Self::un(), TOLERANCE_COMPARAISON)?;
            if compare_un == 0 {
                if self.definitivement_egal(&Self::un())? {
                    return Ok(Self::zero());
                }
            } else if compare_un < 0 {
                return Ok(self.inverse()?.ln()?.negation());
            }
            if let Some(entier) = self.rationnel.en_entier() {
                if self.propriete_est_un() {
                    if let Some(petit) = Self::log_petite_puissance(GenreLog::Ln, &entier)? {
                        return Ok(petit);
                    }
                } else if let Some(carre) = self.arg_racine().and_then(|a| a.en_entier()) {
                    // reconnaître n^k·√n, qui a aussi une réponse plus utile
                    if carre.bits() < 30 {
                        let base = carre.to_i32().unwrap_or(i32::MAX);
                        let k = log_entier(&entier, base)?;
                        if k != 0 {
                            let rationnel = RationnelBorne::entier(k)
                                .ajouter(&RationnelBorne::moitie());
                            if let Some(r) = rationnel {
                                return Ok(Self::brut(
                                    r,
                                    Reel::depuis_entier(carre.clone()).ln()?,
                                    Some(Propriete::ln(RationnelBorne::depuis_entier(carre))),
                                ));
                            }
                        }
                    }
                }
            }
            if self.propriete_est_un() {
                // normaliser vers un argument > 1, et retenir la forme
                return Self::representation_log(GenreLog::Ln, &self.rationnel);
            }
        }
        Ok(Self::brut(
            RationnelBorne::un(),
            self.valeur_reelle().ln()?,
            None,
        ))
    }

    /// Logarithme décimal.
    pub fn log(&self) -> Resultat<ReelUnifie> {
        self.ln()?.diviser(&Self::ln10())
    }
}

/* ------------------------ valeur absolue / factorielle ------------------------ */

impl ReelUnifie {
    pub fn valeur_absolue(&self) -> Resultat<ReelUnifie> {
        if self.est_comparable(&Self::zero())? {
            Ok(if self.signum()? < 0 {
                self.negation()
            } else {
                self.clone()
            })
        } else {
            let propriete = match &self.propriete {
                Some(p) if p.est_irrationnel_inconnu() => Some(Propriete::Irrationnel),
                _ => None,
            };
            Ok(Self::brut(
                RationnelBorne::un(),
                self.valeur_reelle().abs(),
                propriete,
            ))
        }
    }

    // Factorielle généralisée : n·(n−pas)·(n−2·pas)·…, découpée en deux
    // moitiés pour profiter d'une multiplication sous-quadratique.
    fn factorielle_generale(n: i64, pas: i64) -> Resultat<BigInt> {
        if n > 4 * pas {
            let produit1 = Self::factorielle_generale(n, 2 * pas)?;
            point_annulation()?;
            let produit2 = Self::factorielle_generale(n - pas, 2 * pas)?;
            point_annulation()?;
            Ok(produit1 * produit2)
        } else {
            if n == 0 {
                return Ok(BigInt::one());
            }
            let mut resultat = BigInt::from(n);
            let mut i = n - pas;
            while i > 1 {
                resultat *= BigInt::from(i);
                i -= pas;
            }
            Ok(resultat)
        }
    }

    /// Factorielle. Échoue si l'argument n'est clairement pas entier ;
    /// peut arrondir à l'entier le plus proche s'il en est tout près.
    pub fn factorielle(&self) -> Resultat<ReelUnifie> {
        let entier = match self.en_entier() {
            Some(n) => n,
            None => {
                let approche = self.valeur_reelle().approx(0)?; // juste si c'était un entier
                if !self.egal_approx(&Self::depuis_bigint(approche.clone()), TOLERANCE_COMPARAISON)? {
                    return Err(Erreur::Domaine("factorielle d'un argument non entier"));
                }
                approche
            }
        };
        if signe(&entier) < 0 {
            return Err(Erreur::Domaine("factorielle d'un négatif"));
        }
        if entier.bits() > 18 {
            // plusieurs millions de chiffres : autant renoncer tout de suite
            return Err(Erreur::TropGrand("argument de factorielle"));
        }
        let n = entier.to_i64().unwrap_or(0);
        let resultat = Self::factorielle_generale(n, 1)?;
        Ok(Self::depuis_rationnel(RationnelBorne::depuis_entier(resultat)))
    }
}

/* ------------------------ requêtes d'affichage ------------------------ */

impl ReelUnifie {
    /// Chiffres après la virgule nécessaires à une écriture décimale
    /// exacte ; None si elle n'existe pas (ou n'est pas connue exister).
    pub fn chiffres_requis(&self) -> Option<u32> {
        if self.propriete_est_un() || self.rationnel.signum() == 0 {
            self.rationnel.chiffres_requis()
        } else {
            None
        }
    }

    /// jolie_chaine() produira-t-elle une écriture exacte ?
    pub fn affichable_exactement(&self) -> bool {
        self.propriete.as_ref().is_some_and(|p| p.determine_reel())
    }

    /// Peut-on tronquer exactement (vers zéro) les approximations
    /// décimales de ce nombre ?
    pub fn troncature_exacte(&self) -> bool {
        // Rationnel connu : comparaisons exactes possibles. Irrationnel
        // connu : comparer aux approximations rationnelles est sûr,
        // l'égalité étant impossible, la comparaison converge. Seuls les
        // cas "on ne sait pas" posent problème.
        self.propriete_est_un() || self.rationnel.signum() == 0 || self.definitivement_irrationnel()
    }

    /// Les bits à gauche du point dépassent-ils borne ? Réponse inexacte :
    /// les bits entiers sont estimés grossièrement. borne ≥ 0.
    pub fn bits_entiers_depassent(&self, borne: i32) -> Resultat<bool> {
        debug_assert!(borne >= 0);
        let borne_reel = self.propriete.as_ref().and_then(|p| p.msb_borne());
        let bits_rationnel = self.rationnel.bits_entiers();
        if let (Some(br), Some(bq)) = (borne_reel, bits_rationnel) {
            Ok(bq as i32 + br > borne)
        } else {
            Ok(self.valeur_reelle().approx(borne - 2)?.bits() > 2)
        }
    }

    /// Invariant interne : si la propriété détermine un réel, elle doit
    /// décrire (approximativement, à 2^prec près) le même nombre que le
    /// facteur constructif stocké.
    pub fn propriete_correcte(&self, prec: Precision) -> Resultat<bool> {
        let propriete = match &self.propriete {
            None => return Ok(true),
            Some(p) => p,
        };
        let reel_propriete = match reel_depuis_propriete(propriete)? {
            None => return Ok(true),
            Some(r) => r,
        };
        if let Some(borne) = propriete.msb_borne() {
            let minimum = Reel::un().decaler_gauche(borne)?;
            if reel_propriete.abs().comparer_tol(&minimum, prec)? < 0 {
                // msb_borne a produit un résultat faux
                return Ok(false);
            }
        }
        Ok(self.reel.comparer_tol(&reel_propriete, prec)? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entier(n: i64) -> ReelUnifie {
        ReelUnifie::depuis_i64(n)
    }

    fn frac(n: i64, d: i64) -> ReelUnifie {
        ReelUnifie::depuis_rationnel(RationnelBorne::fraction(n, d))
    }

    #[test]
    fn rationnels_exacts() {
        // 1/3 + 1/6 = 1/2, exactement
        let r = frac(1, 3).ajouter(&frac(1, 6)).unwrap();
        let moitie = ReelUnifie::moitie();
        assert!(r.definitivement_rationnel());
        assert_eq!(r.comparer(&moitie).unwrap(), 0);
        assert!(r.definitivement_egal(&moitie).unwrap());
    }

    #[test]
    fn racine_de_douze_se_simplifie() {
        // √12 = 2√3
        let racine12 = entier(12).racine_carree().unwrap();
        assert_eq!(racine12.rationnel, RationnelBorne::deux());
        assert_eq!(
            racine12.propriete,
            Some(Propriete::Racine(RationnelBorne::trois()))
        );
        assert!(racine12.definitivement_irrationnel());
    }

    #[test]
    fn racine2_fois_racine2_exactement_deux() {
        let racine2 = entier(2).racine_carree().unwrap();
        let produit = racine2.multiplier(&racine2).unwrap();
        // le chemin symbolique doit rendre la comparaison décidable AVANT
        // toute évaluation décimale
        assert!(produit.est_comparable(&entier(2)).unwrap());
        assert!(produit.definitivement_rationnel());
        assert_eq!(produit.comparer(&entier(2)).unwrap(), 0);
    }

    #[test]
    fn racines_comparees_par_carres() {
        let racine2 = entier(2).racine_carree().unwrap();
        let racine3 = entier(3).racine_carree().unwrap();
        assert!(racine2.est_comparable(&racine3).unwrap());
        assert_eq!(racine2.comparer(&racine3).unwrap(), -1);
        // 2√3 > 3√2 ? 12 < 18 : non
        let deux_racine3 = entier(2).multiplier(&racine3).unwrap();
        let trois_racine2 = entier(3).multiplier(&racine2).unwrap();
        assert_eq!(deux_racine3.comparer(&trois_racine2).unwrap(), -1);
    }

    #[test]
    fn ln8_sur_ln2_vaut_trois() {
        let huit = entier(8);
        let deux = entier(2);
        let quotient = huit.ln().unwrap().diviser(&deux.ln().unwrap()).unwrap();
        // ln(8) = 3·ln(2) est reconnu symboliquement : quotient rationnel
        assert!(quotient.definitivement_rationnel());
        assert_eq!(quotient.en_entier().unwrap(), BigInt::from(3));
    }

    #[test]
    fn ln_et_log_symboliques() {
        let mille = entier(1000);
        let log_mille = mille.log().unwrap();
        assert_eq!(log_mille.en_entier().unwrap(), BigInt::from(3));
        // ln(10)/ln(10) = 1
        let un = ReelUnifie::dix()
            .ln()
            .unwrap()
            .diviser(&ReelUnifie::ln10())
            .unwrap();
        assert!(un.definitivement_egal(&ReelUnifie::un()).unwrap());
    }

    #[test]
    fn exp_et_ln_se_defont() {
        let trois = entier(3);
        let retour = trois.exp().unwrap().ln().unwrap();
        assert!(retour.definitivement_egal(&trois).unwrap());
        // e^a · e^b = e^(a+b) : propriété conservée
        let e2 = entier(2).exp().unwrap();
        let e5 = entier(5).exp().unwrap();
        let produit = e2.multiplier(&e5).unwrap();
        assert_eq!(
            produit.propriete,
            Some(Propriete::Exp(RationnelBorne::entier(7)))
        );
    }

    #[test]
    fn sin_cos_angles_speciaux() {
        // sin(π/6) = 1/2
        let pi_sur_6 = ReelUnifie::pi()
            .multiplier(&frac(1, 6))
            .unwrap();
        let sinus = pi_sur_6.sinus().unwrap();
        assert!(sinus.definitivement_egal(&ReelUnifie::moitie()).unwrap());
        // cos(π/3) = 1/2
        let pi_sur_3 = ReelUnifie::pi().multiplier(&frac(1, 3)).unwrap();
        let cosinus = pi_sur_3.cosinus().unwrap();
        assert!(cosinus.definitivement_egal(&ReelUnifie::moitie()).unwrap());
        // tan(π/2) : non défini
        let pi_sur_2 = ReelUnifie::pi().multiplier(&frac(1, 2)).unwrap();
        assert!(matches!(pi_sur_2.tangente(), Err(Erreur::Domaine(_))));
    }

    #[test]
    fn asin_symbolique() {
        // asin(1/2) = π/6
        let r = ReelUnifie::moitie().arcsinus().unwrap();
        let attendu = ReelUnifie::pi().multiplier(&frac(1, 6)).unwrap();
        assert!(r.definitivement_egal(&attendu).unwrap());
        // asin(√2/2) = π/4
        let r = entier(2)
            .racine_carree()
            .unwrap()
            .multiplier(&ReelUnifie::moitie())
            .unwrap()
            .arcsinus()
            .unwrap();
        let attendu = ReelUnifie::pi().multiplier(&frac(1, 4)).unwrap();
        assert!(r.definitivement_egal(&attendu).unwrap());
        assert!(matches!(
            entier(2).arcsinus(),
            Err(Erreur::Domaine(_))
        ));
    }

    #[test]
    fn puissances_remarquables() {
        // 0^0 = 1 par convention
        let r = ReelUnifie::zero().puissance(&ReelUnifie::zero()).unwrap();
        assert!(r.definitivement_egal(&ReelUnifie::un()).unwrap());
        // 0^(-1) : domaine
        assert!(matches!(
            ReelUnifie::zero().puissance(&ReelUnifie::moins_un()),
            Err(Erreur::Domaine(_))
        ));
        // 8^(2/3) = 4
        let r = entier(8).puissance(&frac(2, 3)).unwrap();
        assert!(r.definitivement_egal(&entier(4)).unwrap());
        // 2^(1/2) = √2, irrationnel connu
        let r = entier(2).puissance(&frac(1, 2)).unwrap();
        assert!(r.definitivement_irrationnel());
    }

    #[test]
    fn puissance_astronomique_refusee() {
        // 10^(100!) doit échouer vite, pas geler
        let cent_factorielle = entier(100).factorielle().unwrap();
        assert!(matches!(
            ReelUnifie::dix().puissance(&cent_factorielle),
            Err(Erreur::TropGrand(_))
        ));
    }

    #[test]
    fn factorielle_et_domaine() {
        let r = entier(5).factorielle().unwrap();
        assert_eq!(r.en_entier().unwrap(), BigInt::from(120));
        assert!(matches!(
            entier(-3).factorielle(),
            Err(Erreur::Domaine(_))
        ));
        assert!(matches!(
            frac(1, 2).factorielle(),
            Err(Erreur::Domaine(_))
        ));
    }

    #[test]
    fn independance_et_comparabilite() {
        // π et √2 sont indépendants : comparaison décidable
        let pi = ReelUnifie::pi();
        let racine2 = entier(2).racine_carree().unwrap();
        assert!(pi.independants(&racine2).unwrap());
        assert!(pi.est_comparable(&racine2).unwrap());
        assert_eq!(pi.comparer(&racine2).unwrap(), 1);
        // e et π : pas d'indépendance connue
        assert!(!ReelUnifie::e().independants(&pi).unwrap());
        // e^2 et e^5 : indépendants par Lindemann–Weierstrass
        let e2 = entier(2).exp().unwrap();
        let e5 = entier(5).exp().unwrap();
        assert!(e2.independants(&e5).unwrap());
    }

    #[test]
    fn transcendance() {
        assert!(ReelUnifie::pi().definitivement_transcendant());
        assert!(ReelUnifie::e().definitivement_transcendant());
        assert!(entier(2).exp().unwrap().definitivement_transcendant());
        assert!(entier(2).ln().unwrap().definitivement_transcendant());
        let racine2 = entier(2).racine_carree().unwrap();
        assert!(!racine2.definitivement_transcendant());
        assert!(racine2.definitivement_algebrique());
    }

    #[test]
    fn chiffres_requis_decimaux() {
        assert_eq!(frac(1, 8).chiffres_requis(), Some(3));
        assert_eq!(frac(1, 3).chiffres_requis(), None);
        assert_eq!(ReelUnifie::pi().chiffres_requis(), None);
    }

    #[test]
    fn propriete_coherente_avec_le_reel() {
        let racine12 = entier(12).racine_carree().unwrap();
        assert!(racine12.propriete_correcte(-100).unwrap());
        let e2 = entier(2).exp().unwrap();
        assert!(e2.propriete_correcte(-100).unwrap());
        let sin_pi_5 = ReelUnifie::pi()
            .multiplier(&frac(1, 5))
            .unwrap()
            .sinus()
            .unwrap();
        assert!(sin_pi_5.propriete_correcte(-100).unwrap());
    }
}
