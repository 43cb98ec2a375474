// src/noyau/fonctions.rs
//
// Fonctions unaires sur les réels constructifs, comme valeurs de première
// classe : composition, inverse d'une fonction strictement monotone
// (bissection amorcée par interpolation linéaire), dérivée d'une fonction
// à dérivée monotone (différences finies à pas adaptatif).

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use std::sync::{Arc, Mutex};

use super::annulation::point_annulation;
use super::erreur::{Erreur, Precision, Resultat};
use super::reel::{decaler, echelle, Forme, Reel};
use super::rationnel::signe;

/// Fonction unaire sur les réels, applicable et composable.
#[derive(Clone)]
pub struct FonctionReelle {
    f: Arc<dyn Fn(&Reel) -> Resultat<Reel> + Send + Sync>,
}

impl FonctionReelle {
    fn nouvelle(f: impl Fn(&Reel) -> Resultat<Reel> + Send + Sync + 'static) -> Self {
        Self { f: Arc::new(f) }
    }

    pub fn appliquer(&self, x: &Reel) -> Resultat<Reel> {
        (self.f)(x)
    }

    pub fn identite() -> Self {
        Self::nouvelle(|x| Ok(x.clone()))
    }

    pub fn negation() -> Self {
        Self::nouvelle(|x| Ok(x.negation()))
    }

    pub fn inverse_mult() -> Self {
        Self::nouvelle(|x| Ok(x.inverse()))
    }

    pub fn valeur_absolue() -> Self {
        Self::nouvelle(|x| Ok(x.abs()))
    }

    pub fn exp() -> Self {
        Self::nouvelle(|x| x.exp())
    }

    pub fn ln() -> Self {
        Self::nouvelle(|x| x.ln())
    }

    pub fn racine_carree() -> Self {
        Self::nouvelle(|x| Ok(x.racine_carree()))
    }

    pub fn sinus() -> Self {
        Self::nouvelle(|x| x.sin())
    }

    pub fn cosinus() -> Self {
        Self::nouvelle(|x| x.cos())
    }

    pub fn tangente() -> Self {
        Self::nouvelle(|x| Ok(x.sin()?.diviser(&x.cos()?)))
    }

    pub fn arcsinus() -> Self {
        Self::nouvelle(|x| x.asin())
    }

    pub fn arccosinus() -> Self {
        Self::nouvelle(|x| x.acos())
    }

    /// Utilise (sin x)² = (tan x)²/(1+(tan x)²) : connaissant la tangente
    /// du résultat, on retrouve son sinus — avec le bon signe de racine —
    /// puis on passe par arcsinus.
    pub fn arctangente() -> Self {
        Self::nouvelle(|x| {
            let x2 = x.multiplier(x);
            let abs_sin_atan = x2.diviser(&Reel::un().ajouter(&x2)).racine_carree();
            let sin_atan = x.selection(&abs_sin_atan.negation(), &abs_sin_atan);
            sin_atan.asin()
        })
    }

    /// self ∘ autre.
    pub fn composer(&self, autre: &FonctionReelle) -> FonctionReelle {
        let f1 = self.clone();
        let f2 = autre.clone();
        Self::nouvelle(move |x| f1.appliquer(&f2.appliquer(x)?))
    }

    /// Inverse de self, qui doit être définie et strictement monotone sur
    /// [bas, haut]. Le résultat n'est défini que sur l'image de cet
    /// intervalle. Croissante ou décroissante, peu importe.
    pub fn inverse_monotone(&self, bas: &Reel, haut: &Reel) -> Resultat<FonctionReelle> {
        let donnees = Arc::new(DonneesInverseMonotone::nouvelle(self, bas, haut)?);
        Ok(Self::nouvelle(move |x| {
            let arg = if donnees.f_negatee {
                x.negation()
            } else {
                x.clone()
            };
            Ok(Reel::noeud(Forme::InverseMonotone(donnees.clone(), arg)))
        }))
    }

    /// Dérivée de self, définie sur [bas, haut] ; la dérivée doit exister,
    /// être continue et monotone sur l'intervalle ouvert, où seul le
    /// résultat est défini.
    pub fn derivee_monotone(&self, bas: &Reel, haut: &Reel) -> Resultat<FonctionReelle> {
        let donnees = Arc::new(DonneesDeriveeMonotone::nouvelle(self, bas, haut)?);
        Ok(Self::nouvelle(move |x| {
            let arg = ArgumentDerivee::nouveau(&donnees, x)?;
            Ok(Reel::noeud(Forme::DeriveeMonotone(
                donnees.clone(),
                Box::new(arg),
            )))
        }))
    }
}

/* ------------------------ inverse monotone ------------------------ */

pub(crate) struct DonneesInverseMonotone {
    f: FonctionReelle, // croissante ; une décroissante est niée
    f_negatee: bool,
    bas: Reel,
    haut: Reel,
    f_bas: Reel,
    f_haut: Reel,
    /// Borne sur le msd de f(bas) et f(haut)… non : de |bas| et |haut|.
    max_msd: i32,
    /// 2^max_prec_arg est une petite fraction de haut − bas.
    max_prec_arg: i32,
    /// msd approché de la dérivée première.
    msd_derivee: i32,
}

impl DonneesInverseMonotone {
    fn nouvelle(func: &FonctionReelle, bas: &Reel, haut: &Reel) -> Resultat<Self> {
        let f_bas_brut = func.appliquer(bas)?;
        let f_haut_brut = func.appliquer(haut)?;
        // func est monotone et bas < haut : cette comparaison converge.
        let (f, f_negatee, f_bas, f_haut) = if f_bas_brut.comparer(&f_haut_brut)? > 0 {
            (
                FonctionReelle::negation().composer(func),
                true,
                f_bas_brut.negation(),
                f_haut_brut.negation(),
            )
        } else {
            (func.clone(), false, f_bas_brut, f_haut_brut)
        };
        let max_msd = bas.abs().max(&haut.abs()).msd_divergent()?;
        let max_prec_arg = haut.soustraire(bas).msd_divergent()? - 4;
        let msd_derivee = f_haut
            .soustraire(&f_bas)
            .diviser(&haut.soustraire(bas))
            .msd_divergent()?;
        Ok(Self {
            f,
            f_negatee,
            bas: bas.clone(),
            haut: haut.clone(),
            f_bas,
            f_haut,
            max_msd,
            max_prec_arg,
            msd_derivee,
        })
    }
}

// Comparaison où une différence d'une unité vaut égalité.
fn comparaison_large(x: &BigInt, y: &BigInt) -> i32 {
    let difference = x - y;
    if difference > BigInt::one() {
        1
    } else if difference < BigInt::from(-1) {
        -1
    } else {
        0
    }
}

pub(crate) fn approximer_inverse_monotone(
    soi: &Reel,
    d: &DonneesInverseMonotone,
    arg: &Reel,
    p: Precision,
) -> Resultat<BigInt> {
    const PREC_ARG_EXTRA: i32 = 4;
    let fn_ = &d.f;
    // Nombre de pas inefficaces pas encore compensés par un pas de
    // recherche binaire.
    let mut deficit_petits_pas: i32 = 0;
    let chiffres_requis = d.max_msd - p;
    if chiffres_requis < 0 {
        return Ok(BigInt::zero());
    }
    let prec_arg = (p - PREC_ARG_EXTRA).min(d.max_prec_arg);
    let mut prec_eval = prec_arg + d.msd_derivee - 20; // estimation initiale
    // Bissection + méthode de la sécante : convergence toujours linéaire,
    // quadratique sous hypothèses favorables. l et h sont implicitement
    // cadrés par prec_arg, strictement entre bas et haut ; f_l et f_h par
    // prec_eval. at_gauche/at_droite : l (resp. h) tient lieu d'extrémité,
    // f_l (resp. f_h) approximant la valeur de la fonction à l'extrémité.
    let bas_appr = d.bas.approx(prec_arg)? + 1i32;
    let haut_appr = d.haut.approx(prec_arg)? - 1i32;
    let mut arg_appr = arg.approx(prec_eval)?;
    let instantane = soi.instantane_cache();
    let bonne_appr = matches!(instantane, Some((prec, _)) if prec < d.max_msd);
    let mut l: BigInt;
    let mut h: BigInt;
    let mut f_l: BigInt;
    let mut f_h: BigInt;
    let mut a_gauche: bool;
    let mut a_droite: bool;
    if chiffres_requis < 30 && !bonne_appr {
        log::trace!("inverse monotone : intervalle = domaine entier");
        h = haut_appr.clone();
        f_h = d.f_haut.approx(prec_eval)?;
        l = bas_appr.clone();
        f_l = d.f_bas.approx(prec_eval)?;
        // cas clairement hors bornes ; les cas limites échoueront autrement
        if f_h < &arg_appr - 1 || f_l > &arg_appr + 1 {
            return Err(Erreur::Domaine("inverse hors de l'image de l'intervalle"));
        }
        a_gauche = true;
        a_droite = true;
        deficit_petits_pas = 2; // commencer par des pas de bissection
    } else {
        let mut prec_grossiere = p + chiffres_requis / 2;
        if let Some((prec_cache, _)) = instantane {
            if bonne_appr && (chiffres_requis < 30 || prec_cache < p + 3 * chiffres_requis / 4) {
                prec_grossiere = prec_cache;
            }
        }
        let appr_grossiere = soi.approx(prec_grossiere)?;
        log::trace!("inverse monotone : repartir de l'approximation à {prec_grossiere}");
        h = decaler(&appr_grossiere + 1, prec_grossiere - prec_arg);
        l = decaler(&appr_grossiere - 1, prec_grossiere - prec_arg);
        if h > haut_appr {
            h = haut_appr.clone();
            f_h = d.f_haut.approx(prec_eval)?;
            a_droite = true;
        } else {
            let h_reel = Reel::depuis_entier(h.clone()).decalage_brut(prec_arg);
            f_h = fn_.appliquer(&h_reel)?.approx(prec_eval)?;
            a_droite = false;
        }
        if l < bas_appr {
            l = bas_appr.clone();
            f_l = d.f_bas.approx(prec_eval)?;
            a_gauche = true;
        } else {
            let l_reel = Reel::depuis_entier(l.clone()).decalage_brut(prec_arg);
            f_l = fn_.appliquer(&l_reel)?.approx(prec_eval)?;
            a_gauche = false;
        }
    }
    let mut difference = &h - &l;
    loop {
        point_annulation()?;
        if difference < BigInt::from(6) {
            // réponse à moins d'un demi-ulp de h
            return Ok(echelle(h, -PREC_ARG_EXTRA));
        }
        let f_difference = &f_h - &f_l;
        // resserrer l'intervalle en le coupant en un point bien choisi
        let pas_binaire = deficit_petits_pas > 0 || f_difference.is_zero();
        let conjecture = if pas_binaire {
            // pas de bissection, pour garantir la convergence linéaire
            deficit_petits_pas -= 1;
            (&l + &h) >> 1usize
        } else {
            // interpoler ; f_difference est non nul ici
            let arg_difference = &arg_appr - &f_l;
            let t = arg_difference * &difference;
            let mut ajustement = t / &f_difference;
            // À moins de 1/1024 d'une extrémité, s'en écarter : cela
            // améliore nettement les chances de borner la réponse dans le
            // petit intervalle. L'interpolation nous amène souvent Bien
            // plus près que ça.
            if ajustement < &difference >> 10usize {
                ajustement <<= 8usize;
            } else if ajustement > (&difference * BigInt::from(1023)) >> 10usize {
                ajustement = &difference - ((&difference - &ajustement) << 8usize);
            }
            if signe(&ajustement) <= 0 {
                ajustement = BigInt::from(2);
            }
            if ajustement >= difference {
                ajustement = &difference - 2;
            }
            if signe(&ajustement) <= 0 {
                &l + 2
            } else {
                &l + &ajustement
            }
        };
        let mut conjecture = conjecture;
        let mut ecart = BigInt::from(2);
        let mut resultat_comparaison: i32;
        let mut f_conjecture: BigInt;
        let mut ajuster_prec = false;
        loop {
            let conjecture_reelle = Reel::depuis_entier(conjecture.clone()).decalage_brut(prec_arg);
            log::trace!("inverse monotone : évaluation, précision {prec_eval}");
            f_conjecture = fn_.appliquer(&conjecture_reelle)?.approx(prec_eval)?;
            resultat_comparaison = comparaison_large(&f_conjecture, &arg_appr);
            if resultat_comparaison != 0 {
                break;
            }
            point_annulation()?;
            // Alterner : augmenter la précision d'évaluation, et déplacer
            // légèrement la conjecture (elle peut être exactement juste).
            if ajuster_prec {
                let ajustement = (-(f_conjecture.bits() as i32) / 4).min(-20);
                prec_eval += ajustement;
                let l_reel = Reel::depuis_entier(l.clone()).decalage_brut(prec_arg);
                let h_reel = Reel::depuis_entier(h.clone()).decalage_brut(prec_arg);
                f_l = if a_gauche {
                    d.f_bas.approx(prec_eval)?
                } else {
                    fn_.appliquer(&l_reel)?.approx(prec_eval)?
                };
                f_h = if a_droite {
                    d.f_haut.approx(prec_eval)?
                } else {
                    fn_.appliquer(&h_reel)?.approx(prec_eval)?
                };
                arg_appr = arg.approx(prec_eval)?;
            } else {
                let nouvelle = &conjecture + &ecart;
                if nouvelle >= h {
                    conjecture -= &ecart;
                } else {
                    conjecture = nouvelle;
                }
                // Si on retombe toujours pile sur la réponse, alterner le
                // côté du déplacement pour que l'intervalle rétrécisse vite.
                ecart = -ecart;
            }
            ajuster_prec = !ajuster_prec;
        }
        if resultat_comparaison > 0 {
            h = conjecture;
            f_h = f_conjecture;
            a_droite = false;
        } else {
            l = conjecture;
            f_l = f_conjecture;
            a_gauche = false;
        }
        let nouvelle_difference = &h - &l;
        if !pas_binaire {
            if nouvelle_difference >= &difference >> 1usize {
                deficit_petits_pas += 1;
            } else {
                deficit_petits_pas -= 1;
            }
        }
        difference = nouvelle_difference;
    }
}

/* ------------------------ dérivée monotone ------------------------ */

pub(crate) struct DonneesDeriveeMonotone {
    f: FonctionReelle,
    bas: Reel,
    haut: Reel,
    /// msd approché de la dérivée seconde ; remonté à une borne
    /// approximative sur |(f'(y)−f'(x))/(x−y)| pour toutes les paires de
    /// points considérées jusqu'ici.
    msd_derivee2: Mutex<i32>,
}

impl DonneesDeriveeMonotone {
    fn nouvelle(func: &FonctionReelle, bas: &Reel, haut: &Reel) -> Resultat<Self> {
        let milieu = bas.ajouter(haut).decalage_brut(-1);
        let f_bas = func.appliquer(bas)?;
        let f_milieu = func.appliquer(&milieu)?;
        let f_haut = func.appliquer(haut)?;
        let difference = haut.soustraire(bas);
        // msd approché de ((f_haut − f_milieu) − (f_milieu − f_bas)) /
        // (haut − bas) : approximation très grossière de la dérivée
        // seconde, gonflée d'un peu de marge (la sous-estimer coûte des
        // itérations).
        let appr_diff2 = f_haut
            .soustraire(&f_milieu.decalage_brut(1))
            .ajouter(&f_bas);
        let difference_msd = difference.msd_divergent()?;
        let msd_derivee2 = appr_diff2.msd_divergent()? - difference_msd + 4;
        Ok(Self {
            f: func.clone(),
            bas: bas.clone(),
            haut: haut.clone(),
            msd_derivee2: Mutex::new(msd_derivee2),
        })
    }
}

/// Argument préparé d'une évaluation de dérivée.
pub(crate) struct ArgumentDerivee {
    arg: Reel,
    f_arg: Reel,
    max_delta_msd: i32,
}

impl ArgumentDerivee {
    fn nouveau(d: &DonneesDeriveeMonotone, x: &Reel) -> Resultat<Self> {
        let f_arg = d.f.appliquer(x)?;
        // Converge, puisque l'argument doit être dans l'intervalle ouvert.
        let ecart_gauche = x.soustraire(&d.bas);
        let max_delta_gauche = ecart_gauche.msd_divergent()?;
        let ecart_droite = d.haut.soustraire(x);
        let max_delta_droite = ecart_droite.msd_divergent()?;
        if ecart_gauche.signum()? < 0 || ecart_droite.signum()? < 0 {
            return Err(Erreur::Domaine("argument hors de l'intervalle de dérivation"));
        }
        Ok(Self {
            arg: x.clone(),
            f_arg,
            max_delta_msd: max_delta_gauche.min(max_delta_droite),
        })
    }
}

pub(crate) fn approximer_derivee_monotone(
    d: &DonneesDeriveeMonotone,
    a: &ArgumentDerivee,
    p: Precision,
) -> Resultat<BigInt> {
    const PREC_EXTRA: i32 = 4;
    loop {
        let msd_derivee2 = *d.msd_derivee2.lock().expect("mutex dérivée");
        // rester dans l'intervalle
        let log_delta = (p - msd_derivee2).min(a.max_delta_msd) - PREC_EXTRA;
        let delta = Reel::un().decalage_brut(log_delta);
        let gauche = a.arg.soustraire(&delta);
        let droite = a.arg.ajouter(&delta);
        let f_gauche = d.f.appliquer(&gauche)?;
        let f_droite = d.f.appliquer(&droite)?;
        let derivee_gauche = a.f_arg.soustraire(&f_gauche).decalage_brut(-log_delta);
        let derivee_droite = f_droite.soustraire(&a.f_arg).decalage_brut(-log_delta);
        let prec_eval = p - PREC_EXTRA;
        let appr_gauche = derivee_gauche.approx(prec_eval)?;
        let appr_droite = derivee_droite.approx(prec_eval)?;
        let desaccord = (&appr_droite - &appr_gauche).abs();
        if desaccord < BigInt::from(8) {
            return Ok(echelle(appr_gauche, -PREC_EXTRA));
        }
        point_annulation()?;
        // raffiner l'estimation de la dérivée seconde, puis recommencer
        let nouveau_msd = prec_eval + desaccord.bits() as i32 + 4 - log_delta;
        *d.msd_derivee2.lock().expect("mutex dérivée") = nouveau_msd;
    }
}
