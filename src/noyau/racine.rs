// src/noyau/racine.rs
//
// Racine carrée (Newton, amorcé en flottant) et π de Gauss–Legendre.

use num_bigint::BigInt;
use num_traits::{One, ToPrimitive, Zero};
use std::sync::Mutex;

use super::annulation::point_annulation;
use super::erreur::{Erreur, Precision, Resultat};
use super::reel::{decaler, echelle, Reel};

// Estimation prudente du nombre de bits significatifs d'un calcul en
// double précision, et précision d'opérande pour l'amorce flottante.
const PREC_FLOTTANTE: i32 = 50;
const PREC_OP_FLOTTANTE: i32 = 60;

/// √op. En dessous de PREC_FLOTTANTE chiffres de résultat, une racine
/// flottante suffit ; au-delà, une itération de Newton sur l'approximation
/// déjà en cache de `soi` (c'est elle que l'amorce AGM pré-remplit).
pub(crate) fn approximer_racine(soi: &Reel, op: &Reel, p: Precision) -> Resultat<BigInt> {
    let prec_op_max_requise = 2 * p - 1;
    let msd = match op.msd_iteratif(prec_op_max_requise)? {
        Some(m) => m,
        None => return Ok(BigInt::zero()),
    };
    if msd <= prec_op_max_requise {
        return Ok(BigInt::zero());
    }
    let msd_resultat = msd / 2; // ± 1
    let chiffres_resultat = msd_resultat - p; // ± 2
    if chiffres_resultat > PREC_FLOTTANTE {
        // approximation moins précise + une itération de Newton
        let chiffres_appr = chiffres_resultat / 2 + 6;
        let prec_appr = msd_resultat - chiffres_appr;
        let prec_produit = 2 * prec_appr;
        // l'argument d'abord, à précision maximale, pour ne pas le
        // réévaluer incrémentalement
        let appr_op = op.approx(prec_produit)?;
        let derniere_appr = soi.approx(prec_appr)?;
        // (derniere_appr² + appr_op) / derniere_appr / 2, échelles ajustées
        let numerateur_produit = &derniere_appr * &derniere_appr + appr_op;
        let numerateur_cadre = echelle(numerateur_produit, prec_appr - p);
        let resultat_decale = numerateur_cadre / derniere_appr;
        Ok((resultat_decale + 1) >> 1usize)
    } else {
        // amorce en double précision ; précisions paires obligatoires
        let prec_op = (msd - PREC_OP_FLOTTANTE) & !1;
        let prec_travail = prec_op - PREC_OP_FLOTTANTE;
        let appr_cadre = op.approx(prec_op)? << PREC_OP_FLOTTANTE as usize;
        let appr_flottante = appr_cadre.to_f64().unwrap_or(f64::NAN);
        if !(appr_flottante >= 0.0) {
            return Err(Erreur::Domaine("racine carrée d'un négatif"));
        }
        let racine_flottante = appr_flottante.sqrt();
        let racine_cadre = BigInt::from(racine_flottante as i64);
        let decalage = prec_travail / 2 - p;
        Ok(decaler(racine_cadre, decalage))
    }
}

/* ------------------------ π (Gauss–Legendre) ------------------------ */

// La constante π par la moyenne arithmético-géométrique alternée :
//      a[0] = 1,  b[0] = 1/√2,  t[0] = 1/4
//      a[n+1] = (a[n]+b[n])/2      (entre 0,8 et 1)
//      b[n+1] = √(a[n]·b[n])       (entre 0,7 et 1)
//      t[n+1] = t[n] − 2ⁿ·(a[n]−a[n+1])²   (entre 0,2 et 0,25)
// puis π ≈ (a[n+1]+b[n+1])² / (4·t[n+1]).
//
// En plus du cache du noeud, on garde la suite b[n] déjà convergée : à la
// réévaluation suivante, chaque racine repart de l'approximation
// précédente au lieu de recommencer ses itérations de Newton à zéro.
// Contrat de performance, pas de correction.

const TOLERANCE_AGM: i64 = 4;

fn racine_de_moitie() -> Reel {
    use std::sync::OnceLock;
    static RACINE_MOITIE: OnceLock<Reel> = OnceLock::new();
    RACINE_MOITIE
        .get_or_init(|| Reel::un().decalage_brut(-1).racine_carree())
        .clone()
}

pub(crate) fn approximer_pi_gl(
    memo_b: &Mutex<Vec<(Precision, BigInt)>>,
    p: Precision,
) -> Resultat<BigInt> {
    // Les approximations grossières sont faciles.
    if p >= 0 {
        return Ok(echelle(BigInt::from(3), -p));
    }
    // ~log2(−p) itérations ; chacune contribue au plus 2 ulps d'erreur sur
    // son terme, d'où 2·log2(n) bits de marge plus quelques-uns pour le
    // calcul final et l'arrondi.
    let prec_eval_extra = plafond_log2(-p) + 10;
    let prec_eval = p - prec_eval_extra;
    let mut a = BigInt::one() << (-prec_eval) as usize;
    let mut b = racine_de_moitie().approx(prec_eval)?;
    let mut t = BigInt::one() << (-prec_eval - 2) as usize;
    let tolerance = BigInt::from(TOLERANCE_AGM);
    let mut n: usize = 0;
    while &a - &b > tolerance {
        point_annulation()?;
        // valeurs courantes pour n, suivantes pour n+1
        let a_suivant = (&a + &b) >> 1usize;
        let difference_a = &a - &a_suivant;
        let produit_b = (&a * &b) >> (-prec_eval) as usize;
        // Les racines passent par un calcul constructif imbriqué, pour ne
        // pas réimplémenter une racine entière à part.
        let produit_b_reel = Reel::depuis_entier(produit_b).decalage_brut(prec_eval);
        let b_suivant: BigInt;
        {
            let mut memo = memo_b.lock().expect("mutex π");
            let amorce = memo.get(n).cloned();
            let b_reel = match amorce {
                None => produit_b_reel.racine_carree(),
                // repartir de l'approximation convergée du passage précédent
                Some((prec_amorce, val_amorce)) => {
                    Reel::racine_avec_amorce(&produit_b_reel, prec_amorce, val_amorce)
                }
            };
            drop(memo);
            b_suivant = b_reel.approx(prec_eval)?;
            let b_memorise = echelle(b_suivant.clone(), -prec_eval_extra);
            let mut memo = memo_b.lock().expect("mutex π");
            if n < memo.len() {
                memo[n] = (p, b_memorise);
            } else {
                memo.push((p, b_memorise));
            }
        }
        log::trace!("AGM π : itération {n}, précision {prec_eval}");
        // distance de décalage usuellement négative
        let t_suivant = &t - decaler(&difference_a * &difference_a, n as i32 + prec_eval);
        a = a_suivant;
        b = b_suivant;
        t = t_suivant;
        n += 1;
    }
    let somme = &a + &b;
    let resultat = (&somme * &somme / &t) >> 2usize;
    Ok(echelle(resultat, -prec_eval_extra))
}

fn plafond_log2(x: i32) -> i32 {
    debug_assert!(x > 0);
    (32 - (x as u32 - 1).leading_zeros()) as i32
}
