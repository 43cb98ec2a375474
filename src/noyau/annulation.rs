// src/noyau/annulation.rs
//
// Annulation coopérative, à portée lexicale.
//
// Pas de drapeau global "please stop" : un jeton est installé pour la durée
// d'un point d'entrée d'évaluation (garde RAII, restaure le jeton précédent),
// et `point_annulation()` est sondé à chaque terme de série, pas de
// bissection et itération AGM. La détection remonte en `Erreur::Annule`
// proprement ; aucun résultat partiel n'est mis en cache.

use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::erreur::{Erreur, Resultat};

/// Jeton partageable entre threads ; `annuler()` peut être appelé depuis
/// n'importe quel thread, la détection se fait côté calcul.
#[derive(Clone, Debug, Default)]
pub struct JetonAnnulation {
    drapeau: Arc<AtomicBool>,
}

impl JetonAnnulation {
    pub fn nouveau() -> Self {
        Self::default()
    }

    pub fn annuler(&self) {
        self.drapeau.store(true, Ordering::Relaxed);
    }

    pub fn est_annule(&self) -> bool {
        self.drapeau.load(Ordering::Relaxed)
    }
}

thread_local! {
    static JETON_COURANT: RefCell<Option<JetonAnnulation>> = const { RefCell::new(None) };
}

/// Installe `jeton` comme contexte d'annulation pour la durée de `f`.
/// Les portées s'imbriquent ; l'ancien jeton est restauré même si `f`
/// panique.
pub fn avec_jeton<T>(jeton: &JetonAnnulation, f: impl FnOnce() -> T) -> T {
    struct Garde(Option<JetonAnnulation>);
    impl Drop for Garde {
        fn drop(&mut self) {
            let precedent = self.0.take();
            JETON_COURANT.with(|j| *j.borrow_mut() = precedent);
        }
    }
    let precedent = JETON_COURANT.with(|j| j.borrow_mut().replace(jeton.clone()));
    let _garde = Garde(precedent);
    f()
}

/// Point de sondage : Err(Annule) si le jeton de la portée courante est levé.
/// Sans jeton installé, ne coûte qu'une lecture thread-locale.
pub fn point_annulation() -> Resultat<()> {
    let annule = JETON_COURANT.with(|j| j.borrow().as_ref().is_some_and(|t| t.est_annule()));
    if annule {
        Err(Erreur::Annule)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sans_jeton_ne_bloque_pas() {
        assert!(point_annulation().is_ok());
    }

    #[test]
    fn jeton_leve_detecte_dans_la_portee() {
        let jeton = JetonAnnulation::nouveau();
        jeton.annuler();
        let r = avec_jeton(&jeton, point_annulation);
        assert_eq!(r, Err(Erreur::Annule));
        // hors de la portée, plus de jeton
        assert!(point_annulation().is_ok());
    }

    #[test]
    fn portees_imbriquees_restaurees() {
        let externe = JetonAnnulation::nouveau();
        let interne = JetonAnnulation::nouveau();
        interne.annuler();
        avec_jeton(&externe, || {
            assert!(point_annulation().is_ok());
            assert_eq!(avec_jeton(&interne, point_annulation), Err(Erreur::Annule));
            // le jeton externe (non levé) est restauré
            assert!(point_annulation().is_ok());
        });
    }
}
