// src/noyau/rationnel.rs
//
// Rationnels bornés : fractions exactes sur BigInt qui "abandonnent"
// (None) au lieu de grossir au-delà d'un plafond de taille.
//
// Représentation volontairement NON réduite, dénominateur possiblement
// négatif (c'est ce qui la distingue de BigRational, qui normalise tout).
// Les opérations binaires qui pourraient dépasser le plafond renvoient
// None ; la construction et la réduction ne refusent jamais.
//
// Les fonctions irrationnelles (racine n-ième, puissance rationnelle)
// renvoient Some(...) seulement quand le résultat est prouvé rationnel.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::fmt;

use super::annulation::point_annulation;
use super::erreur::{Erreur, Resultat};
use super::reel::Reel;

/// Plafond dur : longueur totale (num + den) en bits.
pub(crate) const TAILLE_MAX: u64 = 10_000;

/// Au-delà de cette longueur, on réduit systématiquement (politique
/// déterministe : la réduction n'a aucun impact mathématique).
const SEUIL_REDUCTION: u64 = 1024;

/// Plus grand entier pour lequel l'extraction de carré est garantie
/// optimale. On échoue par ex. pour 44 = 11·4, mais on réussit pour tous
/// les carrés parfaits × n avec n ≤ 10.
pub(crate) const EXTRACTION_CARRE_MAX_OPT: i64 = 43;

// Longueur maximale (bits) pour tenter l'extraction de carré : assez grand
// pour que les flottants convertis ne la dépassent pas facilement.
const EXTRACTION_CARRE_MAX_LONGUEUR: u64 = 5000;

#[derive(Clone, Debug)]
pub struct RationnelBorne {
    pub(crate) num: BigInt,
    pub(crate) den: BigInt,
}

/* ------------------------ construction ------------------------ */

impl RationnelBorne {
    pub fn nouveau(num: BigInt, den: BigInt) -> Self {
        Self { num, den }
    }

    pub fn depuis_entier(n: BigInt) -> Self {
        Self { num: n, den: BigInt::one() }
    }

    pub fn entier(n: i64) -> Self {
        Self::depuis_entier(BigInt::from(n))
    }

    pub fn fraction(n: i64, d: i64) -> Self {
        Self { num: BigInt::from(n), den: BigInt::from(d) }
    }

    /// Décomposition exacte, bit à bit, de la représentation IEEE.
    pub fn depuis_f64(x: f64) -> Resultat<Self> {
        if !x.is_finite() {
            return Err(Erreur::Domaine("NaN ou infini non convertible en rationnel"));
        }
        let arrondi = x.round();
        if arrondi == x && arrondi.abs() <= 1000.0 {
            return Ok(Self::entier(arrondi as i64));
        }
        let bits = x.abs().to_bits();
        let mut mantisse = (bits & ((1u64 << 52) - 1)) as i64;
        let exp_biaise = (bits >> 52) as i32;
        let signe: i64 = if x < 0.0 { -1 } else { 1 };
        let mut exp = exp_biaise - 1075; // 1023 + 52 : mantisse traitée en entier
        if exp_biaise == 0 {
            exp += 1; // exposant dénormal décalé de 1
        } else {
            mantisse += 1 << 52; // un de tête implicite
        }
        let mut num = BigInt::from(signe * mantisse);
        let mut den = BigInt::one();
        if exp >= 0 {
            num <<= exp as usize;
        } else {
            den <<= (-exp) as usize;
        }
        Ok(Self { num, den })
    }

    /// Interop avec num-rational (entrée déjà réduite par BigRational).
    pub fn depuis_rationnel(r: &BigRational) -> Self {
        Self { num: r.numer().clone(), den: r.denom().clone() }
    }

    /// Interop inverse ; None si le dénominateur est nul (représentation
    /// invalide, ne devrait pas arriver par construction).
    pub fn en_rationnel(&self) -> Option<BigRational> {
        if self.den.is_zero() {
            return None;
        }
        Some(BigRational::new(self.num.clone(), self.den.clone()))
    }

    // Constantes fréquentes.
    pub fn zero() -> Self { Self::entier(0) }
    pub fn un() -> Self { Self::entier(1) }
    pub fn moins_un() -> Self { Self::entier(-1) }
    pub fn deux() -> Self { Self::entier(2) }
    pub fn moins_deux() -> Self { Self::entier(-2) }
    pub fn trois() -> Self { Self::entier(3) }
    pub fn dix() -> Self { Self::entier(10) }
    pub fn douze() -> Self { Self::entier(12) }
    pub fn moitie() -> Self { Self::fraction(1, 2) }
    pub fn moins_moitie() -> Self { Self::fraction(-1, 2) }
    pub fn tiers() -> Self { Self::fraction(1, 3) }
    pub fn quart() -> Self { Self::fraction(1, 4) }
    pub fn sixieme() -> Self { Self::fraction(1, 6) }
    pub fn cent_quatre_vingts() -> Self { Self::entier(180) }
}

/* ------------------------ état / mesures ------------------------ */

impl RationnelBorne {
    pub fn signum(&self) -> i32 {
        signe(&self.num) * signe(&self.den)
    }

    pub fn est_zero(&self) -> bool {
        self.num.is_zero()
    }

    pub fn est_un(&self) -> bool {
        !self.num.is_zero() && self.num == self.den
    }

    /// Bits approximatifs à gauche du point binaire ; None pour zéro.
    /// Négatif = zéros de tête à droite du point.
    pub fn bits_entiers(&self) -> Option<i64> {
        if self.num.is_zero() {
            None
        } else {
            Some(self.num.bits() as i64 - self.den.bits() as i64)
        }
    }

    /// Longueur de la représentation. Surtout pertinent après reduire(),
    /// puisque rien ne réduit implicitement.
    pub fn longueur_bits(&self) -> u64 {
        self.num.bits() + self.den.bits()
    }

    /// log2 approché de la valeur absolue (supposée non nulle).
    /// Exact à ~20 % près ; 0 en cas de doute autour de 1.
    pub fn log2_approx_abs(&self) -> f64 {
        match self.bits_entiers() {
            Some(b) if !(-10..=10).contains(&b) => b as f64,
            _ => {
                let quotient = match (self.num.to_f64(), self.den.to_f64()) {
                    (Some(n), Some(d)) => (n / d).abs(),
                    _ => return 0.0,
                };
                if !quotient.is_finite() || quotient == 0.0 {
                    return 0.0;
                }
                quotient.log2()
            }
        }
    }

    /// Trop gros pour continuer en exact ? Toujours faux pour un entier :
    /// on n'a pas de meilleure solution de repli pour eux.
    fn trop_grand(&self) -> bool {
        !self.den.is_one() && self.longueur_bits() > TAILLE_MAX
    }
}

/* ------------------------ réduction ------------------------ */

impl RationnelBorne {
    /// Fraction équivalente à dénominateur positif.
    pub fn den_positif(&self) -> Self {
        if signe(&self.den) > 0 {
            self.clone()
        } else {
            Self { num: -&self.num, den: -&self.den }
        }
    }

    /// Fraction équivalente en termes irréductibles. Le signe du
    /// dénominateur peut rester négatif.
    pub fn reduire(&self) -> Self {
        if self.den.is_one() {
            return self.clone(); // optimisation seulement
        }
        let diviseur = pgcd(&self.num, &self.den);
        if diviseur.is_zero() {
            return self.clone();
        }
        Self { num: &self.num / &diviseur, den: &self.den / &diviseur }
    }

    /// Version éventuellement réduite qui passe sous le plafond ; None
    /// sinon. Réduction déterministe : dès que la représentation dépasse
    /// le seuil de propreté, ou le plafond.
    fn reduire_peut_etre(r: Option<Self>) -> Option<Self> {
        let r = r?;
        if !r.trop_grand() && r.longueur_bits() < SEUIL_REDUCTION {
            return Some(r);
        }
        let reduit = r.den_positif().reduire();
        if reduit.trop_grand() {
            None
        } else {
            Some(reduit)
        }
    }
}

/* ------------------------ comparaison ------------------------ */

impl RationnelBorne {
    /// -1, 0 ou +1. Produit croisé après prise en compte des signes.
    pub fn comparer(&self, autre: &Self) -> i32 {
        let s1 = self.signum();
        let s2 = autre.signum();
        if s1 != s2 {
            return if s1 > s2 { 1 } else { -1 };
        }
        let gauche = &self.num * &autre.den;
        let droite = &autre.num * &self.den;
        let brut = match gauche.cmp(&droite) {
            std::cmp::Ordering::Less => -1,
            std::cmp::Ordering::Equal => 0,
            std::cmp::Ordering::Greater => 1,
        };
        brut * signe(&self.den) * signe(&autre.den)
    }

    /// Équivalent à comparer(&un()), sans allocation.
    pub fn compare_a_un(&self) -> i32 {
        let brut = match self.num.cmp(&self.den) {
            std::cmp::Ordering::Less => -1,
            std::cmp::Ordering::Equal => 0,
            std::cmp::Ordering::Greater => 1,
        };
        brut * signe(&self.den)
    }
}

impl PartialEq for RationnelBorne {
    fn eq(&self, autre: &Self) -> bool {
        self.comparer(autre) == 0
    }
}
impl Eq for RationnelBorne {}

/* ------------------------ arithmétique ------------------------ */

impl RationnelBorne {
    pub fn ajouter(&self, autre: &Self) -> Option<Self> {
        let den = &self.den * &autre.den;
        let num = &self.num * &autre.den + &autre.num * &self.den;
        Self::reduire_peut_etre(Some(Self { num, den }))
    }

    pub fn negatif(&self) -> Self {
        Self { num: -&self.num, den: self.den.clone() }
    }

    pub fn soustraire(&self, autre: &Self) -> Option<Self> {
        self.ajouter(&autre.negatif())
    }

    /// Produit sans réduction. Les cas "fois un" sont reconnus par valeur.
    pub fn multiplier_brut(&self, autre: &Self) -> Self {
        if self.est_un() {
            return autre.clone();
        }
        if autre.est_un() {
            return self.clone();
        }
        Self { num: &self.num * &autre.num, den: &self.den * &autre.den }
    }

    pub fn multiplier(&self, autre: &Self) -> Option<Self> {
        Self::reduire_peut_etre(Some(self.multiplier_brut(autre)))
    }

    /// Inverse multiplicatif. Erreur dure (jamais None) sur zéro.
    pub fn inverse(&self) -> Resultat<Self> {
        if self.num.is_zero() {
            return Err(Erreur::DivisionParZero);
        }
        Ok(Self { num: self.den.clone(), den: self.num.clone() })
    }

    pub fn diviser(&self, autre: &Self) -> Resultat<Option<Self>> {
        Ok(self.multiplier(&autre.inverse()?))
    }

    /// Entier équivalent s'il existe.
    pub fn en_entier(&self) -> Option<BigInt> {
        if self.den.is_zero() {
            return None;
        }
        let quotient = &self.num / &self.den;
        let reste = &self.num % &self.den;
        if reste.is_zero() {
            Some(quotient)
        } else {
            None
        }
    }

    /// Plus grand entier ≤ self.
    pub fn plancher(&self) -> BigInt {
        let nicer = self.den_positif();
        let quotient = &nicer.num / &nicer.den;
        let reste = &nicer.num % &nicer.den;
        if reste.is_negative() {
            quotient - 1
        } else {
            quotient
        }
    }
}

/* ------------------------ racines ------------------------ */

impl RationnelBorne {
    /// Racine n-ième entière exacte de x, ou None. Le test de racine
    /// parfaite est délégué au moteur constructif, puis vérifié exactement.
    fn racine_n_entier(x: &BigInt, n: i32) -> Resultat<Option<BigInt>> {
        let signe_x = signe(x);
        if signe_x < 0 {
            if n % 2 == 0 {
                return Err(Erreur::Domaine("racine paire d'un négatif"));
            }
            return Ok(Self::racine_n_entier(&-x, n)?.map(|r| -r));
        }
        if signe_x == 0 {
            return Ok(Some(BigInt::zero()));
        }
        let x_reel = Reel::depuis_entier(x.clone());
        let racine_reelle = match n {
            2 => x_reel.racine_carree(),
            4 => x_reel.racine_carree().racine_carree(),
            _ => x_reel.ln()?.diviser(&Reel::depuis_i64(n as i64)).exp()?,
        };
        let echelle = -10;
        let racine_echelle = racine_reelle.approx(echelle)?; // 10 bits à droite du point
        let masque_frac: i32 = (1 << 10) - 1;
        let bits_frac = (&racine_echelle & &BigInt::from(masque_frac))
            .to_i32()
            .unwrap_or(0);
        if bits_frac != 0 && bits_frac != masque_frac {
            // à plus d'un ulp d'un entier : pas une racine parfaite
            return Ok(None);
        }
        let candidat = if bits_frac == 0 {
            &racine_echelle >> 10usize
        } else {
            (&racine_echelle + 1) >> 10usize
        };
        if puissance_entiere_bigint(&candidat, n as u32) == *x {
            Ok(Some(candidat))
        } else {
            Ok(None)
        }
    }

    /// r^(1/n) exact ; None si irrationnel. n ≠ 0. Défini aussi pour r
    /// négatif avec n impair.
    pub fn racine_n(r: &Self, n: i32) -> Resultat<Option<Self>> {
        if n < 0 {
            return match Self::racine_n(r, -n)? {
                None => Ok(None),
                Some(rt) => Ok(Some(rt.inverse()?)),
            };
        }
        let r = r.den_positif().reduire();
        let racine_num = Self::racine_n_entier(&r.num, n)?;
        let racine_den = Self::racine_n_entier(&r.den, n)?;
        match (racine_num, racine_den) {
            (Some(num), Some(den)) => Ok(Some(Self { num, den })),
            _ => Ok(None),
        }
    }

    pub fn racine_carree(r: &Self) -> Resultat<Option<Self>> {
        Self::racine_n(r, 2)
    }
}

/* ------------------------ extraction de carré ------------------------ */

// Quelques premiers et leurs carrés, pour diviser vite.
const PETITS_PREMIERS: [i64; 6] = [2, 3, 5, 7, 11, 13];
const CARRES_PREMIERS: [i64; 6] = [4, 9, 25, 49, 121, 169];

impl RationnelBorne {
    /// Paire (s, r) telle que s²·r = x, x supposé positif. On essaie de
    /// maximiser s, mais pas très fort : le contrat est "une décomposition
    /// utile, pas chère", pas "la décomposition maximale".
    fn extraire_carre(x: &BigInt) -> Resultat<(BigInt, BigInt)> {
        let mut carre = BigInt::one();
        let mut reste = x.clone();
        if reste.bits() > EXTRACTION_CARRE_MAX_LONGUEUR {
            return Ok((carre, reste));
        }
        for (i, premier) in PETITS_PREMIERS.iter().enumerate() {
            if reste.is_one() {
                break;
            }
            let carre_premier = BigInt::from(CARRES_PREMIERS[i]);
            loop {
                let quotient = &reste / &carre_premier;
                let reliquat = &reste % &carre_premier;
                if reliquat.is_zero() {
                    reste = quotient;
                    carre *= BigInt::from(*premier);
                } else {
                    break;
                }
            }
        }
        // reste/<petit entier> est-il un carré parfait ?
        for i in 1i64..=10 {
            let diviseur = BigInt::from(i);
            let quotient = &reste / &diviseur;
            let reliquat = &reste % &diviseur;
            if reliquat.is_zero() {
                if let Some(racine) = Self::racine_n_entier(&quotient, 2)? {
                    reste = diviseur;
                    carre *= racine;
                    break;
                }
            }
        }
        Ok((carre, reste))
    }

    /// Paire (s, r) telle que s²·r = self, self supposé déjà réduit.
    pub fn extraire_carre_reduit(&self) -> Resultat<(Self, Self)> {
        if self.signum() == 0 {
            return Ok((Self::zero(), Self::un()));
        }
        let (carre_num, mut reste_num) = Self::extraire_carre(&self.num.abs())?;
        let (carre_den, reste_den) = Self::extraire_carre(&self.den.abs())?;
        if self.signum() < 0 {
            reste_num = -reste_num;
        }
        Ok((
            Self { num: carre_num, den: carre_den },
            Self { num: reste_num, den: reste_den },
        ))
    }

    /// extraire_carre_reduit garantira-t-il un reste sans carré ?
    /// L'abs() peut allonger d'un bit, d'où le strict.
    pub fn extraction_carre_reussira(&self) -> bool {
        self.num.bits() < EXTRACTION_CARRE_MAX_LONGUEUR
            && self.den.bits() < EXTRACTION_CARRE_MAX_LONGUEUR
    }
}

/* ------------------------ puissances ------------------------ */

impl RationnelBorne {
    // Exponentiation binaire, self réduit, exp ≥ 0. Abandonne (None) dès
    // que le résultat courant dépasserait le plafond.
    fn puissance_brute(&self, exp: &BigInt) -> Resultat<Option<Self>> {
        if exp.is_one() {
            return Ok(Some(self.clone()));
        }
        if est_impair(exp) {
            return Ok(match self.puissance_brute(&(exp - 1))? {
                None => None,
                Some(p) => Some(p.multiplier_brut(self)),
            });
        }
        if exp.is_zero() {
            return Ok(Some(Self::un()));
        }
        let moitie = match self.puissance_brute(&(exp >> 1usize))? {
            None => return Ok(None),
            Some(m) => m,
        };
        point_annulation()?;
        let resultat = moitie.multiplier_brut(&moitie);
        if resultat.trop_grand() {
            return Ok(None);
        }
        Ok(Some(resultat))
    }

    /// Puissance entière. None quand aucun résultat rationnel compact
    /// n'est atteignable.
    pub fn puissance_entiere(&self, exp: &BigInt) -> Resultat<Option<Self>> {
        let signe_exp = signe(exp);
        if signe_exp == 0 {
            // Discutable si la base est nulle ; même convention que pow()
            // flottant : 1.
            return Ok(Some(Self::un()));
        }
        if exp.is_one() {
            return Ok(Some(self.clone()));
        }
        // Une seule réduction au départ ; inutile de re-réduire ensuite.
        let reduit = self.reduire().den_positif();
        // D'abord les cas où un exposant énorme donne un résultat compact.
        if reduit.den.is_one() {
            if reduit.num.is_zero() {
                return Ok(Some(Self::zero()));
            }
            if reduit.num.is_one() {
                return Ok(Some(Self::un()));
            }
            if reduit.num == BigInt::from(-1) {
                return Ok(Some(if est_impair(exp) {
                    Self::moins_un()
                } else {
                    Self::un()
                }));
            }
        }
        if exp.bits() > 1000 {
            // Récursion trop profonde probable ; résultat utile improbable.
            return Ok(None);
        }
        if signe_exp < 0 {
            reduit.inverse()?.puissance_brute(&-exp)
        } else {
            reduit.puissance_brute(exp)
        }
    }

    /// base^exp pour exposant rationnel : racine q-ième exacte d'abord,
    /// None si elle est irrationnelle.
    pub fn puissance(base: &Self, exp: &Self) -> Resultat<Option<Self>> {
        let exp = exp.reduire().den_positif();
        if exp.den.bits() > 30 {
            return Ok(None);
        }
        let exp_den = exp.den.to_i32().unwrap_or(i32::MAX); // sans perte (< 2^30)
        if exp_den == 1 {
            return base.puissance_entiere(&exp.num);
        }
        match Self::racine_n(base, exp_den)? {
            None => Ok(None),
            Some(racine) => racine.puissance_entiere(&exp.num),
        }
    }
}

/* ------------------------ décimales exactes ------------------------ */

impl RationnelBorne {
    /// Nombre de chiffres à droite du point décimal pour une écriture
    /// décimale EXACTE ; None si elle ne termine pas (le dénominateur
    /// réduit a un facteur premier autre que 2 et 5).
    pub fn chiffres_requis(&self) -> Option<u32> {
        // cas facile d'abord
        if self.den.is_one() {
            return Some(0);
        }
        let reduit = self.reduire();
        let mut den = reduit.den.abs();
        if den.bits() > TAILLE_MAX {
            return None;
        }
        let mut puissances_de_deux = 0u32;
        let mut puissances_de_cinq = 0u32;
        while !est_impair(&den) {
            puissances_de_deux += 1;
            den >>= 1usize;
        }
        let cinq = BigInt::from(5);
        loop {
            let reste = &den % &cinq;
            if !reste.is_zero() {
                break;
            }
            puissances_de_cinq += 1;
            den /= &cinq;
        }
        // S'il reste un facteur autre que 2 ou 5 (les diviseurs de 10),
        // l'écriture décimale ne termine jamais.
        if !den.is_one() {
            return None;
        }
        Some(puissances_de_deux.max(puissances_de_cinq))
    }
}

/* ------------------------ affichage brut (debug) ------------------------ */

impl fmt::Display for RationnelBorne {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/* ------------------------ outils entiers ------------------------ */

pub(crate) fn signe(x: &BigInt) -> i32 {
    use num_bigint::Sign;
    match x.sign() {
        Sign::Minus => -1,
        Sign::NoSign => 0,
        Sign::Plus => 1,
    }
}

pub(crate) fn est_impair(x: &BigInt) -> bool {
    !(x % 2i32).is_zero()
}

pub(crate) fn pgcd(a: &BigInt, b: &BigInt) -> BigInt {
    let mut a = a.abs();
    let mut b = b.abs();
    while !b.is_zero() {
        let reste = &a % &b;
        a = b;
        b = reste;
    }
    a
}

pub(crate) fn puissance_entiere_bigint(base: &BigInt, exp: u32) -> BigInt {
    let mut acc = BigInt::one();
    let mut b = base.clone();
    let mut e = exp;
    while e > 0 {
        if e & 1 == 1 {
            acc *= &b;
        }
        e >>= 1;
        if e > 0 {
            b = &b * &b;
        }
    }
    acc
}

/* ------------------------ conversion flottante ------------------------ */

impl RationnelBorne {
    /// Approximation double, correctement arrondie au plus proche, égalité
    /// tranchée loin de zéro.
    pub fn valeur_f64(&self) -> f64 {
        let signum = self.signum();
        if signum < 0 {
            return -self.negatif().valeur_f64();
        }
        // On obtient la mantisse en divisant num par den après un
        // pré-cadrage qui garantit assez de bits dans la partie entière :
        // la troncature vers zéro est alors sans perte.
        let exp_approx = self.num.bits() as i64 - self.den.bits() as i64;
        if exp_approx < -1100 || signum == 0 {
            // clairement zéro, sortie rapide
            return 0.0;
        }
        let prec_requise = (exp_approx - 80) as i32;
        let dividende = if prec_requise < 0 {
            &self.num << (-prec_requise) as usize
        } else {
            self.num.clone()
        };
        let diviseur = if prec_requise > 0 {
            &self.den << prec_requise as usize
        } else {
            self.den.clone()
        };
        let quotient = (&dividende / &diviseur).abs();
        let longueur_q = quotient.bits() as i32;
        let mut bits_en_trop = longueur_q - 53;
        let mut exposant = prec_requise + longueur_q; // point binaire de tête
        if exposant >= -1021 {
            // le point binaire est en fait à droite du bit de tête
            exposant -= 1;
        } else {
            // zone de dénormalisation progressive : on lâche plus de bits
            bits_en_trop += -1022 - exposant + 1;
            exposant = -1023;
        }
        let mut grande_mantisse =
            (&quotient + decaler(&BigInt::one(), bits_en_trop - 1)) >> bits_en_trop.max(0) as usize;
        if bits_en_trop < 0 {
            grande_mantisse = &quotient << (-bits_en_trop) as usize;
        }
        // l'arrondi peut faire déborder la mantisse d'un bit
        if exposant > -1023 && grande_mantisse.bits() as i32 == 54 {
            grande_mantisse >>= 1usize;
            exposant += 1;
        }
        if exposant > 1024 {
            return f64::INFINITY;
        }
        let mantisse = grande_mantisse.to_u64().unwrap_or(0);
        let bits = (mantisse & ((1u64 << 52) - 1)) | (((exposant + 1023) as u64) << 52);
        f64::from_bits(bits)
    }

    /// Réel constructif équivalent.
    pub fn valeur_reelle(&self) -> Reel {
        Reel::depuis_entier(self.num.clone()).diviser(&Reel::depuis_entier(self.den.clone()))
    }
}

// Décalage signé : n < 0 décale à droite.
fn decaler(k: &BigInt, n: i32) -> BigInt {
    if n >= 0 {
        k << n as usize
    } else {
        k >> (-n) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frac(n: i64, d: i64) -> RationnelBorne {
        RationnelBorne::fraction(n, d)
    }

    #[test]
    fn egalite_par_produit_croise() {
        assert_eq!(frac(1, 2), frac(2, 4));
        assert_eq!(frac(1, -2), frac(-1, 2));
        assert_ne!(frac(1, 2), frac(1, 3));
    }

    #[test]
    fn reduire_idempotent() {
        let r = frac(6, -4).reduire();
        let rr = r.reduire();
        assert_eq!(r.num, rr.num);
        assert_eq!(r.den, rr.den);
    }

    #[test]
    fn addition_soustraction_inverse() {
        let a = frac(7, 3);
        let b = frac(-11, 5);
        let somme = a.ajouter(&b).unwrap();
        let retour = somme.soustraire(&b).unwrap();
        assert_eq!(retour, a);
    }

    #[test]
    fn produit_par_inverse_donne_un() {
        let a = frac(-9, 14);
        let p = a.multiplier(&a.inverse().unwrap()).unwrap();
        assert_eq!(p.compare_a_un(), 0);
    }

    #[test]
    fn comparaison_antisymetrique() {
        let a = frac(5, 7);
        let b = frac(3, -4);
        assert_eq!(a.comparer(&b), -b.comparer(&a));
        assert_eq!(a.comparer(&a), 0);
    }

    #[test]
    fn inverse_de_zero_est_une_erreur_dure() {
        assert_eq!(RationnelBorne::zero().inverse(), Err(Erreur::DivisionParZero));
        assert_eq!(
            frac(1, 3).diviser(&RationnelBorne::zero()),
            Err(Erreur::DivisionParZero)
        );
    }

    #[test]
    fn puissance_entiere_compacte() {
        let deux = RationnelBorne::deux();
        let r = deux.puissance_entiere(&BigInt::from(10)).unwrap().unwrap();
        assert_eq!(r.en_entier().unwrap(), BigInt::from(1024));
        // (-1)^énorme reste compact
        let enorme = BigInt::one() << 5000usize;
        let r = RationnelBorne::moins_un()
            .puissance_entiere(&enorme)
            .unwrap()
            .unwrap();
        assert_eq!(r.compare_a_un(), 0);
    }

    #[test]
    fn puissance_abandonne_au_plafond() {
        let r = frac(3, 2)
            .puissance_entiere(&BigInt::from(100_000))
            .unwrap();
        assert!(r.is_none());
    }

    #[test]
    fn racine_exacte_et_irrationnelle() {
        let neuf_quarts = frac(9, 4);
        let racine = RationnelBorne::racine_carree(&neuf_quarts).unwrap().unwrap();
        assert_eq!(racine, frac(3, 2));
        assert!(RationnelBorne::racine_carree(&frac(2, 1)).unwrap().is_none());
        assert!(matches!(
            RationnelBorne::racine_carree(&frac(-1, 1)),
            Err(Erreur::Domaine(_))
        ));
        // racine cubique d'un négatif : définie
        let moins_huit = frac(-8, 1);
        let racine = RationnelBorne::racine_n(&moins_huit, 3).unwrap().unwrap();
        assert_eq!(racine, frac(-2, 1));
    }

    #[test]
    fn puissance_rationnelle() {
        // 8^(2/3) = 4
        let r = RationnelBorne::puissance(&frac(8, 1), &frac(2, 3))
            .unwrap()
            .unwrap();
        assert_eq!(r.en_entier().unwrap(), BigInt::from(4));
        // 2^(1/2) n'a pas de réponse rationnelle exacte
        assert!(RationnelBorne::puissance(&frac(2, 1), &frac(1, 2))
            .unwrap()
            .is_none());
    }

    #[test]
    fn extraction_de_carre() {
        // 12 = 2²·3
        let (s, r) = frac(12, 1).extraire_carre_reduit().unwrap();
        assert_eq!(s, frac(2, 1));
        assert_eq!(r, frac(3, 1));
        // 9/4 entièrement extrait
        let (s, r) = frac(9, 4).reduire().extraire_carre_reduit().unwrap();
        assert_eq!(s, frac(3, 2));
        assert_eq!(r.compare_a_un(), 0);
    }

    #[test]
    fn chiffres_requis_terminant_ou_non() {
        assert_eq!(frac(1, 8).chiffres_requis(), Some(3));
        assert_eq!(frac(3, 50).chiffres_requis(), Some(2));
        assert_eq!(frac(7, 1).chiffres_requis(), Some(0));
        assert_eq!(frac(1, 3).chiffres_requis(), None);
        assert_eq!(frac(2, 6).chiffres_requis(), None);
    }

    #[test]
    fn f64_aller_retour() {
        for x in [0.5, -0.75, 1.0 / 3.0, 6.02e23, -1.0e-300, f64::MIN_POSITIVE] {
            let r = RationnelBorne::depuis_f64(x).unwrap();
            assert_eq!(r.valeur_f64(), x, "x = {x}");
        }
        // dénormal
        let denormal = f64::from_bits(7);
        let r = RationnelBorne::depuis_f64(denormal).unwrap();
        assert_eq!(r.valeur_f64(), denormal);
    }

    #[test]
    fn plancher_et_entier() {
        assert_eq!(frac(7, 2).plancher(), BigInt::from(3));
        assert_eq!(frac(-7, 2).plancher(), BigInt::from(-4));
        assert_eq!(frac(-6, 2).en_entier().unwrap(), BigInt::from(-3));
        assert!(frac(-7, 2).en_entier().is_none());
    }
}
