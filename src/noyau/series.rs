// src/noyau/series.rs
//
// Noyaux de Taylor pré-cadrés. Chaque fonction suppose que le cadrage
// d'argument a déjà été fait par le constructeur du noeud (reel.rs) : la
// série ne tourne donc que sur un petit argument borné, ce qui borne le
// nombre de termes pour une précision cible donnée.
//
// Budget d'erreur type : chaque terme intermédiaire est exact à
// 2·2^prec_calcul près ; l'erreur cumulée de la série est
// 2·termes·2^prec_calcul, hors erreur sur l'opérande ; la troncature de la
// série et l'arrondi final ajoutent moins d'un demi-ulp chacun. Au total,
// erreur finale < 1 ulp à la précision demandée.
//
// L'annulation est sondée à chaque terme.

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

use super::annulation::point_annulation;
use super::erreur::{borne_log2, Precision, Resultat};
use super::reel::{decaler, echelle, Reel};

/// exp(op), |op| ≤ ~2^-9 garanti par le cadrage.
pub(crate) fn approximer_exp_reduite(op: &Reel, p: Precision) -> Resultat<BigInt> {
    if p >= 1 {
        return Ok(BigInt::zero());
    }
    let termes_requis = -p / 2 + 2; // estimation prudente > 0
    let prec_calcul = p - borne_log2(2 * termes_requis) - 4;
    let prec_op = p - 3;
    let appr_op = op.approx(prec_op)?;
    let un_cadre = BigInt::one() << (-prec_calcul) as usize;
    let mut terme_courant = un_cadre.clone();
    let mut somme_courante = un_cadre;
    let mut n: i64 = 0;
    let erreur_tronc_max = BigInt::one() << (p - 4 - prec_calcul) as usize;
    while terme_courant.abs() >= erreur_tronc_max {
        point_annulation()?;
        n += 1;
        // terme_courant = terme_courant · op / n
        terme_courant = echelle(&terme_courant * &appr_op, prec_op);
        terme_courant /= BigInt::from(n);
        somme_courante += &terme_courant;
    }
    Ok(echelle(somme_courante, prec_calcul - p))
}

/// cos(op), |op| < 1.
pub(crate) fn approximer_cos_reduit(op: &Reel, p: Precision) -> Resultat<BigInt> {
    if p >= 1 {
        return Ok(BigInt::zero());
    }
    let termes_requis = -p / 2 + 4;
    let prec_calcul = p - borne_log2(2 * termes_requis) - 4;
    let prec_op = p - 2;
    let appr_op = op.approx(prec_op)?;
    let erreur_tronc_max = BigInt::one() << (p - 4 - prec_calcul) as usize;
    let mut n: i64 = 0;
    let mut terme_courant = BigInt::one() << (-prec_calcul) as usize;
    let mut somme_courante = terme_courant.clone();
    while terme_courant.abs() >= erreur_tronc_max {
        point_annulation()?;
        n += 2;
        // terme_courant = −terme_courant · op² / (n·(n−1))
        terme_courant = echelle(&terme_courant * &appr_op, prec_op);
        terme_courant = echelle(&terme_courant * &appr_op, prec_op);
        let diviseur = BigInt::from(-n) * BigInt::from(n - 1);
        terme_courant /= diviseur;
        somme_courante += &terme_courant;
    }
    Ok(echelle(somme_courante, prec_calcul - p))
}

/// ln(1 + op), |op| < 1/2. Série alternée classique ; rien à réutiliser
/// d'une évaluation à l'autre, d'où la politique de noeud lent.
pub(crate) fn approximer_ln_reduit(op: &Reel, p: Precision) -> Resultat<BigInt> {
    if p >= 0 {
        return Ok(BigInt::zero());
    }
    let termes_requis = -p; // estimation prudente > 0
    let prec_calcul = p - borne_log2(2 * termes_requis) - 4;
    let prec_op = p - 3;
    let appr_op = op.approx(prec_op)?;
    let mut x_puissance_n = decaler(appr_op.clone(), prec_op - prec_calcul);
    let mut terme_courant = x_puissance_n.clone();
    let mut somme_courante = terme_courant.clone();
    let mut n: i64 = 1;
    let mut signe_courant: i64 = 1;
    let erreur_tronc_max = BigInt::one() << (p - 4 - prec_calcul) as usize;
    while terme_courant.abs() >= erreur_tronc_max {
        point_annulation()?;
        n += 1;
        signe_courant = -signe_courant;
        x_puissance_n = echelle(&x_puissance_n * &appr_op, prec_op);
        // xⁿ / (n·(−1)^(n−1))
        terme_courant = &x_puissance_n / BigInt::from(n * signe_courant);
        somme_courante += &terme_courant;
    }
    Ok(echelle(somme_courante, prec_calcul - p))
}

/// asin(op), |op| < (1/2)^(1/3).
///
/// Série Σ x^(2n+1) · (2n)! / (4ⁿ·n!²·(2n+1)) : le coefficient est
/// toujours < 1, donc chaque terme est borné par x^(2n+1). Le cadrage ne
/// peut approcher 1/√2 que par en dessous, d'où un nombre d'itérations
/// pessimiste — sans grande conséquence.
pub(crate) fn approximer_asin_reduit(op: &Reel, p: Precision) -> Resultat<BigInt> {
    if p >= 2 {
        return Ok(BigInt::zero()); // jamais plus grand que 4
    }
    let termes_requis = -3 * p / 2 + 4; // un terme de Taylor sur deux présent
    let prec_calcul = p - borne_log2(2 * termes_requis) - 4;
    let prec_op = p - 3; // toujours ≤ −2
    let appr_op = op.approx(prec_op)?;
    let terme_dernier_max = BigInt::one() << (p - 4 - prec_calcul) as usize;
    let mut exposant: i64 = 1; // = 2n+1
    let mut terme_courant = &appr_op << (prec_op - prec_calcul) as usize;
    let mut somme_courante = terme_courant.clone();
    // terme de série cadré, avant division par l'exposant
    let mut facteur_courant = terme_courant.clone();
    while terme_courant.abs() >= terme_dernier_max {
        point_annulation()?;
        exposant += 2;
        // facteur_courant ← facteur_courant · op² · (exposant−2)/(exposant−1),
        // les deux facteurs (exposant−1) se compensant dans le coefficient.
        facteur_courant *= BigInt::from(exposant - 2);
        facteur_courant = echelle(&facteur_courant * &appr_op, prec_op + 2);
        // deux bits de précision portés en avant
        facteur_courant *= &appr_op;
        facteur_courant /= BigInt::from(exposant - 1);
        facteur_courant = echelle(facteur_courant, prec_op - 2); // retire les 2 bits
        terme_courant = &facteur_courant / BigInt::from(exposant);
        somme_courante += &terme_courant;
    }
    Ok(echelle(somme_courante, prec_calcul - p))
}

/// atan(1/n) pour n entier petit ; la voie simple et honnête vers π.
pub(crate) fn approximer_atan_inverse(n: i64, p: Precision) -> Resultat<BigInt> {
    if p >= 1 {
        return Ok(BigInt::zero());
    }
    let termes_requis = -p / 2 + 2;
    let prec_calcul = p - borne_log2(2 * termes_requis) - 2;
    let un_cadre = BigInt::one() << (-prec_calcul) as usize;
    let grand_op = BigInt::from(n);
    let grand_op_carre = BigInt::from(n * n);
    let inverse_op = &un_cadre / &grand_op;
    let mut puissance_courante = inverse_op.clone();
    let mut terme_courant = inverse_op.clone();
    let mut somme_courante = inverse_op;
    let mut signe_courant: i64 = 1;
    let mut k: i64 = 1;
    let erreur_tronc_max = BigInt::one() << (p - 2 - prec_calcul) as usize;
    while terme_courant.abs() >= erreur_tronc_max {
        point_annulation()?;
        k += 2;
        puissance_courante = &puissance_courante / &grand_op_carre;
        signe_courant = -signe_courant;
        terme_courant = &puissance_courante / BigInt::from(signe_courant * k);
        somme_courante += &terme_courant;
    }
    Ok(echelle(somme_courante, prec_calcul - p))
}
