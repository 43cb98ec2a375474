//! Tests scientifiques (campagne) : invariants + robustesse + limites contrôlées.
//!
//! But : vérifier les identités mathématiques de bout en bout sans faire
//! chauffer la machine.
//! - budget temps global par test
//! - précisions serrées mais bornées (2^-200 pour les identités, 3000 bits
//!   pour la contre-vérification de π)
//! - les chemins symboliques sont vérifiés comme tels : on affirme
//!   est_comparable AVANT toute évaluation décimale quand la forme doit
//!   rendre la comparaison décidable.

use std::time::{Duration, Instant};

use num_bigint::BigInt;

use super::annulation::{avec_jeton, JetonAnnulation};
use super::erreur::Erreur;
use super::fonctions::FonctionReelle;
use super::rationnel::RationnelBorne;
use super::reel::Reel;
use super::reel_unifie::ReelUnifie;

/// Budget global anti-gel.
fn budget(depart: Instant, max: Duration) {
    if depart.elapsed() > max {
        panic!("budget temps dépassé : {max:?}");
    }
}

fn unifie(n: i64) -> ReelUnifie {
    ReelUnifie::depuis_i64(n)
}

fn frac(n: i64, d: i64) -> ReelUnifie {
    ReelUnifie::depuis_rationnel(RationnelBorne::fraction(n, d))
}

/* ------------------------ π ------------------------ */

#[test]
fn sci_pi_contre_serie_de_machin() {
    // L'AGM de Gauss–Legendre et la série d'arctangentes doivent coïncider
    // à au moins 3000 bits.
    let t0 = Instant::now();
    assert_eq!(
        Reel::pi().comparer_tol(&Reel::pi_atan(), -3000).unwrap(),
        0
    );
    budget(t0, Duration::from_secs(30));
}

/* ------------------------ identités trigonométriques ------------------------ */

#[test]
fn sci_sin2_plus_cos2_egale_un() {
    let t0 = Instant::now();
    let un = Reel::un();
    for (n, d) in [(1, 3), (-2, 1), (5, 7), (13, 4), (-31, 10)] {
        let x = Reel::depuis_i64(n).diviser(&Reel::depuis_i64(d));
        let sinus = x.sin().unwrap();
        let cosinus = x.cos().unwrap();
        let somme = sinus
            .multiplier(&sinus)
            .ajouter(&cosinus.multiplier(&cosinus));
        assert_eq!(
            somme.comparer_tol(&un, -200).unwrap(),
            0,
            "sin²+cos² ≠ 1 pour x = {n}/{d}"
        );
        budget(t0, Duration::from_secs(30));
    }
}

#[test]
fn sci_asin_defait_sin() {
    let t0 = Instant::now();
    // x dans (-π/2, π/2) : asin(sin(x)) = x sans résidu au-delà de la
    // tolérance
    for (n, d) in [(1, 2), (-1, 1), (7, 5), (-13, 10)] {
        let x = Reel::depuis_i64(n).diviser(&Reel::depuis_i64(d));
        let retour = x.sin().unwrap().asin().unwrap();
        assert_eq!(
            retour.comparer_tol(&x, -150).unwrap(),
            0,
            "asin(sin(x)) ≠ x pour x = {n}/{d}"
        );
        budget(t0, Duration::from_secs(30));
    }
}

#[test]
fn sci_atan_defait_tan() {
    let t0 = Instant::now();
    let tangente = FonctionReelle::tangente();
    let arctangente = FonctionReelle::arctangente();
    for (n, d) in [(1, 2), (-1, 1), (5, 4)] {
        let x = Reel::depuis_i64(n).diviser(&Reel::depuis_i64(d));
        let retour = arctangente
            .appliquer(&tangente.appliquer(&x).unwrap())
            .unwrap();
        assert_eq!(
            retour.comparer_tol(&x, -150).unwrap(),
            0,
            "atan(tan(x)) ≠ x pour x = {n}/{d}"
        );
        budget(t0, Duration::from_secs(30));
    }
}

/* ------------------------ exp / ln ------------------------ */

#[test]
fn sci_ln_exp_aller_retour() {
    let t0 = Instant::now();
    for (n, d) in [(1, 1), (-3, 2), (10, 3)] {
        let x = Reel::depuis_i64(n).diviser(&Reel::depuis_i64(d));
        let retour = x.exp().unwrap().ln().unwrap();
        assert_eq!(retour.comparer_tol(&x, -200).unwrap(), 0);
        budget(t0, Duration::from_secs(30));
    }
    // exp(ln(x)) = x pour x > 0
    for (n, d) in [(7, 1), (1, 5), (355, 113)] {
        let x = Reel::depuis_i64(n).diviser(&Reel::depuis_i64(d));
        let retour = x.ln().unwrap().exp().unwrap();
        assert_eq!(retour.comparer_tol(&x, -200).unwrap(), 0);
        budget(t0, Duration::from_secs(30));
    }
}

/* ------------------------ combinateurs génériques ------------------------ */

#[test]
fn sci_inverse_monotone_retrouve_l_argument() {
    let t0 = Instant::now();
    // inverse du sinus sur [-1, 1], évalué en sin(1/2)
    let bas = Reel::depuis_i64(-1);
    let haut = Reel::un();
    let arcsin = FonctionReelle::sinus().inverse_monotone(&bas, &haut).unwrap();
    let x = Reel::un().decalage_brut(-1); // 1/2
    let retour = arcsin.appliquer(&x.sin().unwrap()).unwrap();
    assert_eq!(retour.comparer_tol(&x, -60).unwrap(), 0);
    budget(t0, Duration::from_secs(30));

    // fonction décroissante : inverse de -x³… via la négation de l'identité
    // composée, plus simple : cos sur [0, 1] décroît
    let arccos = FonctionReelle::cosinus()
        .inverse_monotone(&Reel::zero(), &Reel::un())
        .unwrap();
    let y = Reel::depuis_i64(3).diviser(&Reel::depuis_i64(10));
    let retour = arccos.appliquer(&y.cos().unwrap()).unwrap();
    assert_eq!(retour.comparer_tol(&y, -60).unwrap(), 0);
    budget(t0, Duration::from_secs(30));
}

#[test]
fn sci_inverse_monotone_rejette_hors_image() {
    // l'image de sin sur [-1, 1] est [sin(-1), sin(1)] ⊂ (-0,85, 0,85) :
    // demander l'antécédent de 2 doit échouer en erreur de domaine
    let arcsin = FonctionReelle::sinus()
        .inverse_monotone(&Reel::depuis_i64(-1), &Reel::un())
        .unwrap();
    let hors = arcsin.appliquer(&Reel::depuis_i64(2)).unwrap();
    assert!(matches!(hors.approx(-10), Err(Erreur::Domaine(_))));
}

#[test]
fn sci_derivee_monotone_de_exp() {
    let t0 = Instant::now();
    // (exp)' = exp ; la dérivée en 1 vaut e
    let derivee = FonctionReelle::exp()
        .derivee_monotone(&Reel::zero(), &Reel::depuis_i64(2))
        .unwrap();
    let en_un = derivee.appliquer(&Reel::un()).unwrap();
    assert_eq!(en_un.comparer_tol(&Reel::e(), -50).unwrap(), 0);
    budget(t0, Duration::from_secs(30));
}

/* ------------------------ annulation ------------------------ */

#[test]
fn sci_annulation_interrompt_proprement() {
    let jeton = JetonAnnulation::nouveau();
    jeton.annuler();
    // un calcul volontairement coûteux, sous un jeton déjà levé : il doit
    // ressortir en Annule, pas geler ni rendre un résultat partiel
    let r = avec_jeton(&jeton, || Reel::pi().approx(-200_000));
    assert_eq!(r, Err(Erreur::Annule));
    // hors de la portée, le même calcul modeste aboutit
    assert!(Reel::pi().approx(-50).is_ok());
}

/* ------------------------ scénarios de bout en bout ------------------------ */

#[test]
fn sci_scenarios_calculatrice() {
    let t0 = Instant::now();

    // √12 se simplifie en 2√3 et se tronque en 3.46410
    let racine12 = unifie(12).racine_carree().unwrap();
    assert_eq!(racine12.jolie_chaine(false, false, false).unwrap(), "2√3");
    assert_eq!(racine12.chaine_decimale(5).unwrap(), "3.46410");

    // asin(0,5) : π/6 en radians, 30 en degrés
    let asin_moitie = ReelUnifie::depuis_f64(0.5).unwrap().arcsinus().unwrap();
    assert_eq!(asin_moitie.jolie_chaine(false, false, false).unwrap(), "π/6");
    let en_degres = asin_moitie
        .diviser(&ReelUnifie::radians_par_degre())
        .unwrap();
    assert_eq!(en_degres.jolie_chaine(true, false, false).unwrap(), "30");

    // 1/3 + 1/6 = 1/2 exactement
    let somme = frac(1, 3).ajouter(&frac(1, 6)).unwrap();
    assert!(somme.definitivement_egal(&ReelUnifie::moitie()).unwrap());

    // ln(8)/ln(2) reconnu comme l'entier 3
    let quotient = unifie(8).ln().unwrap().diviser(&unifie(2).ln().unwrap()).unwrap();
    assert_eq!(quotient.en_entier().unwrap(), BigInt::from(3));

    // 0^0 = 1 ; 0^(-1) : erreur de domaine
    let zero_zero = ReelUnifie::zero().puissance(&ReelUnifie::zero()).unwrap();
    assert!(zero_zero.definitivement_egal(&ReelUnifie::un()).unwrap());
    assert!(matches!(
        ReelUnifie::zero().puissance(&ReelUnifie::moins_un()),
        Err(Erreur::Domaine(_))
    ));

    // 10^(100!) : trop grand, signalé sans gel
    let cent_factorielle = unifie(100).factorielle().unwrap();
    assert!(matches!(
        ReelUnifie::dix().puissance(&cent_factorielle),
        Err(Erreur::TropGrand(_))
    ));

    budget(t0, Duration::from_secs(30));
}

#[test]
fn sci_racine2_fois_racine2_sans_evaluation() {
    // √2·√2 = 2 par le chemin symbolique : est_comparable doit être vrai
    // avant toute demande de décimales
    let racine2 = unifie(2).racine_carree().unwrap();
    let produit = racine2.multiplier(&racine2).unwrap();
    assert!(produit.est_comparable(&unifie(2)).unwrap());
    assert_eq!(produit.comparer(&unifie(2)).unwrap(), 0);
    assert_eq!(produit.chaine_decimale(3).unwrap(), "2.000");
}

#[test]
fn sci_f64_aller_retour_unifie() {
    for x in [
        0.0,
        -0.0,
        1.0,
        -2.5,
        0.1,
        1.0 / 3.0,
        6.62607015e-34,
        1.0e300,
        f64::MIN_POSITIVE,
    ] {
        let u = ReelUnifie::depuis_f64(x).unwrap();
        assert_eq!(u.valeur_f64().unwrap(), x, "aller-retour f64 pour {x}");
    }
}

#[test]
fn sci_gros_rationnels_restent_exacts() {
    let t0 = Instant::now();
    // numérateur de 100 chiffres : tout doit rester exact et rapide
    let gros: BigInt = format!("9{}", "8".repeat(99)).parse().unwrap();
    let a = ReelUnifie::depuis_rationnel(RationnelBorne::nouveau(gros, BigInt::from(7)));
    let b = frac(1, 7);
    let somme = a.ajouter(&b).unwrap();
    assert!(somme.definitivement_rationnel());
    let difference = somme.soustraire(&b).unwrap();
    assert!(difference.definitivement_egal(&a).unwrap());
    budget(t0, Duration::from_millis(2000));
}

#[test]
fn sci_notation_scientifique() {
    // primitive signe/mantisse/exposant
    let r = Reel::depuis_chaine("0.00123", 10).unwrap();
    let rep = r.repr_flottante(3, 10, 50).unwrap();
    assert_eq!(rep.signe, 1);
    assert_eq!(rep.mantisse, "123");
    assert_eq!(rep.exposant, -2);
    // zéro à la précision demandée
    let petit = Reel::depuis_chaine("0", 10).unwrap();
    let rep = petit.repr_flottante(3, 10, 20).unwrap();
    assert_eq!(rep.signe, 0);
    assert_eq!(rep.mantisse, "0");
}
