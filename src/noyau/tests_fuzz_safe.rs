//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler la couche unifiée sans brûler la machine.
//! - RNG déterministe (graine fixe)
//! - profondeur bornée, opérandes petits
//! - budget temps global
//! - on accepte les erreurs *attendues* (division par zéro, domaine,
//!   résultat trop grand) ; tout le reste est un échec
//! - invariants clés : zéro connu ⇒ troncature "0.000…" ; a + b − b
//!   reste égal à a ; les comparaisons tolérantes sont réflexives

use std::time::{Duration, Instant};

use super::erreur::Erreur;
use super::rationnel::RationnelBorne;
use super::reel_unifie::ReelUnifie;

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    etat: u64,
}

impl Rng {
    fn nouveau(graine: u64) -> Self {
        Self { etat: graine }
    }
    fn suivant_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.etat = self.etat.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.etat >> 32) as u32
    }
    fn tirer(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.suivant_u32() % n
        }
    }
}

/* ------------------------ budget anti-gel ------------------------ */

fn budget(depart: Instant, max: Duration) {
    if depart.elapsed() > max {
        panic!("budget temps dépassé : {max:?}");
    }
}

/* ------------------------ aides fuzz ------------------------ */

fn est_erreur_attendue(e: &Erreur) -> bool {
    // Liste blanche : erreurs *normales* pour un fuzz, le domaine étant
    // volontairement malmené. Annule et DebordementPrecision ne doivent
    // jamais sortir d'ici : aucune annulation n'est posée, et aucune
    // combinaison générée ne compare deux égaux non reconnus.
    matches!(
        e,
        Erreur::DivisionParZero
            | Erreur::Domaine(_)
            | Erreur::TropGrand(_)
            | Erreur::ZeroPuissanceZero
    )
}

// Génère une feuille : petit rationnel, π, e, ou petite racine.
fn gen_feuille(rng: &mut Rng) -> ReelUnifie {
    match rng.tirer(8) {
        0 => ReelUnifie::zero(),
        1 => ReelUnifie::un(),
        2 => ReelUnifie::pi(),
        3 => ReelUnifie::e(),
        4 => ReelUnifie::depuis_i64(rng.tirer(20) as i64 - 10),
        5 => {
            let n = rng.tirer(9) as i64 + 2;
            ReelUnifie::depuis_i64(n)
                .racine_carree()
                .expect("racine d'un positif")
        }
        6 => ReelUnifie::depuis_rationnel(RationnelBorne::fraction(
            rng.tirer(13) as i64 - 6,
            rng.tirer(6) as i64 + 1,
        )),
        _ => ReelUnifie::moitie(),
    }
}

// Combine récursivement, profondeur bornée. Les erreurs attendues coupent
// la branche en rendant l'opérande gauche.
fn gen_expression(rng: &mut Rng, profondeur: u32) -> ReelUnifie {
    if profondeur == 0 {
        return gen_feuille(rng);
    }
    let a = gen_expression(rng, profondeur - 1);
    let b = gen_expression(rng, profondeur - 1);
    let resultat = match rng.tirer(6) {
        0 => a.ajouter(&b),
        1 => a.soustraire(&b),
        2 => a.multiplier(&b),
        3 => {
            // ne diviser que par un dénominateur dont la non-nullité est
            // décidable sans évaluation (sinon le quotient pourrait
            // diverger plus tard)
            if b.definitivement_non_nul() {
                a.diviser(&b)
            } else {
                a.ajouter(&b)
            }
        }
        4 => a.valeur_absolue(),
        _ => {
            let exposant = ReelUnifie::depuis_i64(rng.tirer(5) as i64);
            a.puissance(&exposant)
        }
    };
    match resultat {
        Ok(r) => r,
        Err(e) if est_erreur_attendue(&e) => a,
        Err(e) => panic!("erreur inattendue du fuzz : {e:?}"),
    }
}

/* ------------------------ campagnes ------------------------ */

#[test]
fn fuzz_troncature_ne_gele_pas() {
    let t0 = Instant::now();
    let max = Duration::from_secs(60);
    let mut rng = Rng::nouveau(0xC0FFEE);
    for _ in 0..60 {
        let e = gen_expression(&mut rng, 3);
        match e.chaine_decimale(6) {
            Ok(texte) => {
                assert!(texte.contains('.'), "toujours un point décimal : {texte:?}");
                // zéro connu ⇒ écriture nulle
                if e.definitivement_zero() {
                    assert_eq!(texte.trim_start_matches('-'), "0.000000");
                }
            }
            Err(err) => assert!(est_erreur_attendue(&err), "erreur inattendue : {err:?}"),
        }
        budget(t0, max);
    }
}

#[test]
fn fuzz_a_plus_b_moins_b() {
    let t0 = Instant::now();
    let max = Duration::from_secs(60);
    let mut rng = Rng::nouveau(0xDEC0DE);
    for _ in 0..40 {
        let a = gen_expression(&mut rng, 2);
        let b = gen_expression(&mut rng, 2);
        let Ok(somme) = a.ajouter(&b) else { continue };
        let Ok(retour) = somme.soustraire(&b) else {
            continue;
        };
        // égalité à forte tolérance : jamais de divergence ici
        assert!(
            retour.egal_approx(&a, -100).unwrap(),
            "a + b − b s'écarte de a"
        );
        budget(t0, max);
    }
}

#[test]
fn fuzz_comparaison_tolerante_reflexive() {
    let t0 = Instant::now();
    let max = Duration::from_secs(60);
    let mut rng = Rng::nouveau(0xFEED);
    for _ in 0..40 {
        let e = gen_expression(&mut rng, 3);
        assert_eq!(e.comparer_tol(&e.clone(), -100).unwrap(), 0);
        // l'antisymétrie sur un couple quelconque, à la même tolérance
        let f = gen_expression(&mut rng, 2);
        let direct = e.comparer_tol(&f, -100).unwrap();
        let inverse = f.comparer_tol(&e, -100).unwrap();
        if direct != 0 {
            assert_eq!(direct, -inverse);
        }
        budget(t0, max);
    }
}

#[test]
fn fuzz_rationnels_exacts_par_construction() {
    // expressions composées uniquement de rationnels : le résultat doit
    // toujours rester reconnu rationnel (jamais de bascule numérique)
    let t0 = Instant::now();
    let max = Duration::from_secs(30);
    let mut rng = Rng::nouveau(0xB00);
    for _ in 0..80 {
        let a = RationnelBorne::fraction(rng.tirer(19) as i64 - 9, rng.tirer(7) as i64 + 1);
        let b = RationnelBorne::fraction(rng.tirer(19) as i64 - 9, rng.tirer(7) as i64 + 1);
        let ua = ReelUnifie::depuis_rationnel(a);
        let ub = ReelUnifie::depuis_rationnel(b);
        for operation in 0..3u32 {
            let r = match operation {
                0 => ua.ajouter(&ub),
                1 => ua.soustraire(&ub),
                _ => ua.multiplier(&ub),
            }
            .unwrap();
            assert!(r.definitivement_rationnel());
        }
        budget(t0, max);
    }
}
