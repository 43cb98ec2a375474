// src/noyau/proprietes.rs
//
// Formes symboliques attachées au facteur constructif d'un réel unifié.
//
// Chaque variante décrit exactement le réel constructif qu'elle étiquette
// (sauf Irrationnel, qui dit seulement "irrationnel, forme inconnue").
// On normalise à la construction : exp(0) est représenté par Un, ln(1/2)
// par −ln(2), etc. Pour tout sauf Un, les arguments qui décriraient une
// valeur rationnelle sont interdits.
//
// L'égalité est PAR VALEUR (produit croisé sur les arguments) : aucune
// décision ne repose sur le partage de noeuds.

use num_bigint::BigInt;
use num_traits::{One, Zero};

use super::annulation::point_annulation;
use super::erreur::Resultat;
use super::fonctions::FonctionReelle;
use super::rationnel::{est_impair, signe, RationnelBorne};
use super::reel::Reel;

#[derive(Clone, Debug, PartialEq)]
pub enum Propriete {
    /// Le facteur constructif vaut 1.
    Un,
    Pi,
    /// √arg, arg > 0 et ≠ 1, non carré parfait. L'argument est minimal
    /// (sans facteur carré > 1) dès que num et den < EXTRACTION_CARRE_MAX_OPT.
    Racine(RationnelBorne),
    /// exp(arg), arg ≠ 0.
    Exp(RationnelBorne),
    /// ln(arg), arg > 1.
    Ln(RationnelBorne),
    /// log₁₀(arg), arg > 1 et pas une puissance de 10. Si log(a/b) valait
    /// un rationnel positif c/d, on aurait a^d/b^d = 10^c ; a/b réduit
    /// force b = 1 et a racine ou puissance n-ième de 10 ; 10 n'a pas de
    /// racine entière, donc a est une puissance de 10. Sinon, irrationnel.
    Log(RationnelBorne),
    /// sin(π·arg), arg strictement entre 0 et 1/2, hors {1/6, 1/4, 1/3} :
    /// par le théorème de Niven, le résultat est toujours irrationnel.
    SinPi(RationnelBorne),
    /// tan(π·arg), mêmes contraintes ; toujours irrationnel.
    TanPi(RationnelBorne),
    /// asin(arg), arg strictement entre −1 et 1, non nul, ≠ ±1/2.
    /// Toujours irrationnel.
    Asin(RationnelBorne),
    /// atan(arg), arg non nul, ≠ ±1. Toujours irrationnel.
    Atan(RationnelBorne),
    /// Irrationnel, forme inconnue.
    Irrationnel,
}

/* ------------------------ construction normalisée ------------------------ */

impl Propriete {
    pub fn racine(arg: RationnelBorne) -> Propriete {
        let arg = arg.reduire().den_positif();
        if arg.est_un() {
            return Propriete::Un;
        }
        debug_assert!(arg.signum() > 0);
        Propriete::Racine(arg)
    }

    pub fn exp(arg: RationnelBorne) -> Propriete {
        if arg.signum() == 0 {
            return Propriete::Un;
        }
        Propriete::Exp(arg.reduire().den_positif())
    }

    pub fn ln(arg: RationnelBorne) -> Propriete {
        let arg = arg.reduire().den_positif();
        debug_assert!(arg.compare_a_un() > 0);
        Propriete::Ln(arg)
    }

    pub fn log(arg: RationnelBorne) -> Propriete {
        let arg = arg.reduire().den_positif();
        debug_assert!(arg.compare_a_un() > 0);
        Propriete::Log(arg)
    }

    pub fn sin_pi(arg: RationnelBorne) -> Propriete {
        let arg = arg.reduire().den_positif();
        debug_assert!(!trig_reducible(&arg));
        Propriete::SinPi(arg)
    }

    pub fn tan_pi(arg: RationnelBorne) -> Propriete {
        let arg = arg.reduire().den_positif();
        debug_assert!(!trig_reducible(&arg));
        Propriete::TanPi(arg)
    }

    pub fn asin(arg: RationnelBorne) -> Propriete {
        let arg = arg.reduire().den_positif();
        debug_assert!(arg.signum() != 0);
        debug_assert!(arg.comparer(&RationnelBorne::moins_un()) > 0);
        debug_assert!(arg.comparer(&RationnelBorne::un()) < 0);
        debug_assert!(arg.comparer(&RationnelBorne::moitie()) != 0);
        debug_assert!(arg.comparer(&RationnelBorne::moins_moitie()) != 0);
        Propriete::Asin(arg)
    }

    pub fn atan(arg: RationnelBorne) -> Propriete {
        let arg = arg.reduire().den_positif();
        debug_assert!(arg.signum() != 0);
        debug_assert!(arg.comparer(&RationnelBorne::un()) != 0);
        debug_assert!(arg.comparer(&RationnelBorne::moins_un()) != 0);
        Propriete::Atan(arg)
    }
}

/* ------------------------ interrogation ------------------------ */

impl Propriete {
    pub fn est_un(&self) -> bool {
        matches!(self, Propriete::Un)
    }

    pub fn est_pi(&self) -> bool {
        matches!(self, Propriete::Pi)
    }

    pub fn est_irrationnel_inconnu(&self) -> bool {
        matches!(self, Propriete::Irrationnel)
    }

    /// La propriété détermine-t-elle le nombre de façon unique ?
    pub fn determine_reel(&self) -> bool {
        !matches!(self, Propriete::Irrationnel)
    }

    pub fn arg(&self) -> Option<&RationnelBorne> {
        match self {
            Propriete::Un | Propriete::Pi | Propriete::Irrationnel => None,
            Propriete::Racine(a)
            | Propriete::Exp(a)
            | Propriete::Ln(a)
            | Propriete::Log(a)
            | Propriete::SinPi(a)
            | Propriete::TanPi(a)
            | Propriete::Asin(a)
            | Propriete::Atan(a) => Some(a),
        }
    }

    /// Rang du genre, pour n'écrire qu'une moitié de la table
    /// d'indépendance.
    pub(crate) fn ordre(&self) -> u8 {
        match self {
            Propriete::Un => 1,
            Propriete::Pi => 2,
            Propriete::Racine(_) => 3,
            Propriete::Exp(_) => 4,
            Propriete::Ln(_) => 5,
            Propriete::Log(_) => 6,
            Propriete::SinPi(_) => 7,
            Propriete::TanPi(_) => 8,
            Propriete::Asin(_) => 9,
            Propriete::Atan(_) => 10,
            Propriete::Irrationnel => 11,
        }
    }

    pub(crate) fn meme_genre(&self, autre: &Propriete) -> bool {
        self.ordre() == autre.ordre()
    }

    /// La propriété garantit-elle une valeur non nulle ?
    pub fn est_non_nul(&self) -> bool {
        match self {
            Propriete::Un | Propriete::Pi | Propriete::Irrationnel => true,
            // Répondre toujours vrai serait correct, mais on refuse
            // volontairement la garantie pour les arguments très négatifs :
            // distinguer la valeur de zéro coûterait une évaluation
            // hors de prix, que "vrai" a tendance à déclencher.
            // Seuil réglable, sans portée sémantique.
            Propriete::Exp(arg) => arg.comparer(&RationnelBorne::entier(-10_000)) >= 0,
            // arg > 1
            Propriete::Ln(_) | Propriete::Log(_) => true,
            // arg > 0
            Propriete::Racine(_) => true,
            // arg ≠ 0
            Propriete::SinPi(_) | Propriete::TanPi(_) | Propriete::Asin(_) | Propriete::Atan(_) => {
                true
            }
        }
    }

    /// Le nombre décrit est-il algébrique (par opposition à transcendant) ?
    pub fn est_algebrique(&self) -> bool {
        matches!(
            self,
            Propriete::Un | Propriete::Racine(_) | Propriete::SinPi(_) | Propriete::TanPi(_)
        )
    }

    /// Borne n telle que |valeur| ≥ 2^n ; None si on ne sait pas borner.
    pub(crate) fn msb_borne(&self) -> Option<i32> {
        match self {
            Propriete::Un => Some(0),
            Propriete::Pi => Some(1),
            Propriete::Racine(arg) => {
                let bits = arg.bits_entiers()?;
                Some((bits as i32 >> 1) - 2)
            }
            Propriete::Ln(arg) | Propriete::Log(arg) => {
                if arg.comparer(&RationnelBorne::deux()) >= 0 {
                    // ln(2) > log(2) > 1/4
                    Some(-2)
                } else {
                    // argument au voisinage de 1, résultat possiblement
                    // proche de zéro
                    None
                }
            }
            Propriete::Exp(arg) => {
                let plancher = arg.plancher();
                let signum = signe(&plancher);
                if plancher.bits() <= 30 {
                    let v = plancher
                        .to_string()
                        .parse::<i32>()
                        .unwrap_or(0);
                    if signum >= 0 {
                        // multiplier par un peu moins que 1/ln(2)
                        Some(v / 5 * 7)
                    } else {
                        // un peu plus que 1/ln(2), en se trompant du bon côté
                        Some((v / 2 - 1) * 3)
                    }
                } else if signum > 0 {
                    // positif et plus de 30 bits
                    Some(100_000_000)
                } else {
                    None
                }
            }
            // Tous se comportent comme x ou π·x près de zéro, d'où cette
            // estimation très grossière.
            Propriete::SinPi(arg)
            | Propriete::TanPi(arg)
            | Propriete::Asin(arg)
            | Propriete::Atan(arg) => {
                if arg.comparer(&RationnelBorne::fraction(1, 1024)) > 0 {
                    Some(-11)
                } else {
                    None
                }
            }
            Propriete::Irrationnel => None,
        }
    }
}

/* ------------------------ reconstruction du réel ------------------------ */

/// Réel constructif décrit par la propriété ; None pour Irrationnel.
/// Sert à l'invariant de cohérence interne, pas à l'évaluation courante.
pub fn reel_depuis_propriete(p: &Propriete) -> Resultat<Option<Reel>> {
    Ok(match p {
        Propriete::Irrationnel => None,
        Propriete::Un => Some(Reel::un()),
        Propriete::Pi => Some(Reel::pi()),
        Propriete::Exp(arg) => Some(arg.valeur_reelle().exp()?),
        Propriete::Ln(arg) => Some(arg.valeur_reelle().ln()?),
        Propriete::Log(arg) => Some(arg.valeur_reelle().ln()?.diviser(&Reel::ln10())),
        Propriete::Racine(arg) => Some(arg.valeur_reelle().racine_carree()),
        Propriete::SinPi(arg) => Some(arg.valeur_reelle().multiplier(&Reel::pi()).sin()?),
        Propriete::TanPi(arg) => Some(
            FonctionReelle::tangente().appliquer(&arg.valeur_reelle().multiplier(&Reel::pi()))?,
        ),
        Propriete::Asin(arg) => Some(arg.valeur_reelle().asin()?),
        Propriete::Atan(arg) => Some(FonctionReelle::arctangente().appliquer(&arg.valeur_reelle())?),
    })
}

/* ------------------------ réduction trigonométrique ------------------------ */

/// L'argument de trig(π·arg) est-il simplifiable, ou aurait-il dû être
/// ramené dans (0, 1/2) ?
pub(crate) fn trig_reducible(arg: &RationnelBorne) -> bool {
    arg.signum() <= 0
        || arg.comparer(&RationnelBorne::moitie()) >= 0
        || arg.comparer(&RationnelBorne::tiers()) == 0
        || arg.comparer(&RationnelBorne::quart()) == 0
        || arg.comparer(&RationnelBorne::sixieme()) == 0
}

/// Ramène un argument de SinPi/TanPi dans [−1/2, 3/2). None si
/// l'arithmétique rationnelle bornée déborde.
pub(crate) fn arg_trig_reduit(arg: &RationnelBorne) -> Option<RationnelBorne> {
    // éviter le calcul quand on peut ; performance seulement
    if arg.comparer(&RationnelBorne::moins_moitie()) >= 0
        && arg.comparer(&RationnelBorne::fraction(3, 2)) < 0
    {
        return Some(arg.clone());
    }
    let arg_plus_moitie = arg.ajouter(&RationnelBorne::moitie())?;
    let plancher = arg_plus_moitie.plancher();
    // arrondir le décalage à l'entier pair inférieur
    let decalage_pair = if est_impair(&plancher) {
        plancher - 1
    } else {
        plancher
    };
    arg.soustraire(&RationnelBorne::depuis_entier(decalage_pair))
}

/// Propriété pour sin(π·arg), argument normalisé dans la bonne plage ;
/// le booléen indique que la propriété décrit l'argument NÉGATIF.
/// L'appelant garantit que l'argument ne mène pas à une valeur
/// rationnelle. None si la normalisation échoue.
pub(crate) fn propriete_sin_pi(arg: &RationnelBorne) -> Option<(Propriete, bool)> {
    let mut n_arg = arg_trig_reduit(arg)?;
    let mut negatif = false;
    if n_arg.comparer(&RationnelBorne::moitie()) >= 0 {
        // sin(x) = sin(π − x)
        n_arg = RationnelBorne::un().soustraire(&n_arg)?;
    }
    if n_arg.signum() < 0 {
        n_arg = n_arg.negatif();
        negatif = true;
    }
    Some((Propriete::sin_pi(n_arg), negatif))
}

/// Propriété pour tan(π·arg), mêmes conventions que propriete_sin_pi.
pub(crate) fn propriete_tan_pi(arg: &RationnelBorne) -> Option<(Propriete, bool)> {
    let mut n_arg = arg_trig_reduit(arg)?;
    let mut negatif = false;
    if n_arg.comparer(&RationnelBorne::moitie()) >= 0 {
        // tan(x) = tan(x − π)
        n_arg = n_arg.soustraire(&RationnelBorne::un())?;
    }
    if n_arg.signum() < 0 {
        n_arg = n_arg.negatif();
        negatif = true;
    }
    Some((Propriete::tan_pi(n_arg), negatif))
}

/* ------------------------ puissances communes ------------------------ */

const LIMITE_PUISSANCE_COMMUNE: u64 = 200;

/// Rationnel r ≠ 0 tel que a = b^r, ou None. Les deux entiers sont
/// supposés positifs. Pour a = b = 1 on renvoie 1 (n'importe quel
/// rationnel conviendrait). On n'insiste pas sur les grands nombres.
fn puissance_commune_entiers(a: &BigInt, b: &BigInt) -> Resultat<Option<RationnelBorne>> {
    match a.cmp(b) {
        std::cmp::Ordering::Equal => return Ok(Some(RationnelBorne::un())),
        std::cmp::Ordering::Less => {
            return Ok(match puissance_commune_entiers(b, a)? {
                None => None,
                Some(r) => Some(r.inverse()?),
            })
        }
        std::cmp::Ordering::Greater => {}
    }
    if a.is_one() || b.is_one() {
        return Ok(None);
    }
    if a.bits() > LIMITE_PUISSANCE_COMMUNE {
        return Ok(None); // on jette l'éponge
    }
    // Variante de l'algorithme d'Euclide : diviser le grand par le petit.
    // Si a = b^r, alors a/b = b^(r−1).
    point_annulation()?;
    let quotient = a / b;
    let reste = a % b;
    if !reste.is_zero() {
        // Non divisibles : il existe deux premiers dont l'un divise a plus
        // que b et réciproquement, ce qui interdit a^n = b^m. Pas de r.
        return Ok(None);
    }
    Ok(match puissance_commune_entiers(&quotient, b)? {
        None => None,
        Some(r) => r.ajouter(&RationnelBorne::un()),
    })
}

/// a et b ont-ils une puissance entière commune (exposants négatifs
/// compris) ? a et b doivent être positifs.
pub(crate) fn puissance_commune(a: &RationnelBorne, b: &RationnelBorne) -> Resultat<bool> {
    let a = a.reduire().den_positif();
    let b = b.reduire().den_positif();
    let (na, da) = (&a.num, &a.den);
    let (nb, db) = (&b.num, &b.den);
    // Cas où un numérateur et/ou dénominateur vaut 1 : particulier, car la
    // puissance commune n'y est pas déterminée de façon unique.
    if da.is_one() {
        if db.is_one() {
            return Ok(puissance_commune_entiers(na, nb)?.is_some());
        } else if nb.is_one() {
            return Ok(puissance_commune_entiers(na, db)?.is_some());
        }
    } else if na.is_one() {
        if nb.is_one() {
            return Ok(puissance_commune_entiers(da, db)?.is_some());
        } else if db.is_one() {
            return Ok(puissance_commune_entiers(da, nb)?.is_some());
        }
    }
    // Cas général : deux calculs de puissance commune doivent coïncider.
    let nanb = puissance_commune_entiers(na, nb)?;
    let nadb = puissance_commune_entiers(na, db)?;
    if let Some(r) = &nanb {
        // puissance commune, exposants de même signe
        if Some(r) == puissance_commune_entiers(da, db)?.as_ref() {
            return Ok(true);
        }
    }
    if let Some(r) = &nadb {
        // puissance commune, exposants de signes opposés
        if Some(r) == puissance_commune_entiers(da, nb)?.as_ref() {
            return Ok(true);
        }
    }
    Ok(false)
}

/* ------------------------ logarithmes entiers ------------------------ */

/// log en base `base` de n s'il est entier, 0 sinon. n positif, base ≥ 2.
pub(crate) fn log_entier(n: &BigInt, base: i32) -> Resultat<i64> {
    use num_traits::ToPrimitive;
    let n_flottant = n.to_f64().unwrap_or(f64::INFINITY);
    let approx = n_flottant.ln() / (base as f64).ln();
    // un test rapide d'abord ; autre chose pour les valeurs hors f64
    if n_flottant.is_infinite() {
        // le test flottant ne dit rien ; autres tests rapides
        if base % 2 != 0 && !est_impair(n) {
            // divisible par 2 : pas une puissance d'un impair
            return Ok(0);
        }
        if base % 3 != 0 && (n % 3i32).is_zero() {
            return Ok(0);
        }
        if base % 5 != 0 && (n % 5i32).is_zero() {
            return Ok(0);
        }
    } else if (approx - approx.round()).abs() > 1.0e-6 {
        return Ok(0);
    }
    // Éviter d'allouer beaucoup de grands entiers, notamment de diviser
    // par base en boucle, sous peine de très mauvais comportement sur
    // log(100000!). Au pire O(log log n) opérations sur BigInt : table de
    // puissances par carrés successifs, puissances[i] = base^(2^i).
    let mut resultat: i64 = 0;
    let mut puissances = vec![BigInt::from(base)];
    let mut n_reduit = n.clone(); // vaut toujours n / base^resultat
    let mut i = 1usize;
    loop {
        let derniere = puissances[i - 1].clone();
        let suivante = &derniere * &derniere; // base^(2^i)
        if suivante.bits() > n_reduit.bits() {
            break;
        }
        point_annulation()?;
        let quotient = &n_reduit / &suivante;
        let reste = &n_reduit % &suivante;
        if !reste.is_zero() {
            // une puissance de base < 2·n_reduit ne divise pas n_reduit :
            // n n'est clairement pas une puissance de base
            return Ok(0);
        }
        puissances.push(suivante);
        // on tient le quotient : en profiter pour réduire n
        resultat += 1 << i;
        n_reduit = quotient;
        i += 1;
    }
    // Toutes les puissances par carrés ≤ n_reduit sont calculées ; diviser
    // en descendant jusqu'à un, ou conclure négativement.
    let mut i = puissances.len();
    while !n_reduit.is_one() {
        if i == 0 {
            return Ok(0);
        }
        i -= 1;
        let puissance = &puissances[i];
        if puissance.bits() <= n_reduit.bits() {
            point_annulation()?;
            let quotient = &n_reduit / puissance;
            let reste = &n_reduit % puissance;
            if !reste.is_zero() {
                return Ok(0);
            }
            resultat += 1 << i;
            n_reduit = quotient;
            // désormais puissance.bits() > n_reduit.bits(), sinon on
            // aurait divisé par la puissance au-dessus, son carré
        }
    }
    Ok(resultat)
}

/// Si r est une puissance entière positive de 10, son log décimal ;
/// 0 sinon. Suppose r > 1.
pub(crate) fn log10_entier(r: &RationnelBorne) -> Resultat<i64> {
    match r.en_entier() {
        Some(n) if signe(&n) > 0 => log_entier(&n, 10),
        _ => Ok(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalisation_a_la_construction() {
        assert_eq!(Propriete::exp(RationnelBorne::zero()), Propriete::Un);
        assert_eq!(Propriete::racine(RationnelBorne::un()), Propriete::Un);
        assert_eq!(
            Propriete::racine(RationnelBorne::fraction(4, 2)),
            Propriete::Racine(RationnelBorne::deux())
        );
    }

    #[test]
    fn egalite_par_valeur() {
        let a = Propriete::Racine(RationnelBorne::fraction(2, 1));
        let b = Propriete::Racine(RationnelBorne::fraction(4, 2));
        assert_eq!(a, b);
        assert_ne!(a, Propriete::Racine(RationnelBorne::trois()));
        assert_ne!(a, Propriete::Exp(RationnelBorne::deux()));
    }

    #[test]
    fn reduction_trig() {
        // 9/4 → 1/4 (réduction modulo 2)
        let reduit = arg_trig_reduit(&RationnelBorne::fraction(9, 4)).unwrap();
        assert_eq!(reduit, RationnelBorne::quart());
        // -1/3 reste en place (dans [-1/2, 3/2))
        let reste = arg_trig_reduit(&RationnelBorne::fraction(-1, 3)).unwrap();
        assert_eq!(reste, RationnelBorne::fraction(-1, 3));
    }

    #[test]
    fn sin_pi_normalise_et_signe() {
        // sin(π·4/5) = sin(π·1/5)
        let (p, neg) = propriete_sin_pi(&RationnelBorne::fraction(4, 5)).unwrap();
        assert_eq!(p, Propriete::SinPi(RationnelBorne::fraction(1, 5)));
        assert!(!neg);
        // sin(π·(−1/5)) = −sin(π·1/5)
        let (p, neg) = propriete_sin_pi(&RationnelBorne::fraction(-1, 5)).unwrap();
        assert_eq!(p, Propriete::SinPi(RationnelBorne::fraction(1, 5)));
        assert!(neg);
    }

    #[test]
    fn puissances_communes() {
        let huit = RationnelBorne::entier(8);
        let deux = RationnelBorne::deux();
        assert!(puissance_commune(&huit, &deux).unwrap());
        // 8 et 2 via inverses
        let huitieme = RationnelBorne::fraction(1, 8);
        assert!(puissance_commune(&huitieme, &deux).unwrap());
        // 4/9 et 2/3
        assert!(puissance_commune(
            &RationnelBorne::fraction(4, 9),
            &RationnelBorne::fraction(2, 3)
        )
        .unwrap());
        // 6 et 12 n'ont pas de puissance commune
        assert!(!puissance_commune(&RationnelBorne::entier(6), &RationnelBorne::douze()).unwrap());
    }

    #[test]
    fn logs_entiers() {
        assert_eq!(log_entier(&BigInt::from(1024), 2).unwrap(), 10);
        assert_eq!(log_entier(&BigInt::from(1000), 10).unwrap(), 3);
        assert_eq!(log_entier(&BigInt::from(1001), 10).unwrap(), 0);
        assert_eq!(log10_entier(&RationnelBorne::entier(100)).unwrap(), 2);
        assert_eq!(log10_entier(&RationnelBorne::entier(99)).unwrap(), 0);
    }

    #[test]
    fn msb_borne_coherent() {
        assert_eq!(Propriete::Un.msb_borne(), Some(0));
        assert_eq!(Propriete::Pi.msb_borne(), Some(1));
        assert_eq!(
            Propriete::ln(RationnelBorne::dix()).msb_borne(),
            Some(-2)
        );
        // exp très négatif : pas de garantie de non-nullité
        assert!(!Propriete::exp(RationnelBorne::entier(-20_000)).est_non_nul());
        assert!(Propriete::exp(RationnelBorne::entier(-100)).est_non_nul());
    }
}
