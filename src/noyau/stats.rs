// src/noyau/stats.rs
//
// Statistiques sommaires sur l'expression affichée par jolie_chaine() :
// petit enregistrement en lecture seule, rempli par le noyau, que la
// couche d'affichage utilise pour comparer la complexité d'écritures
// équivalentes.

use super::proprietes::Propriete;
use super::rationnel::RationnelBorne;
use super::reel_unifie::ReelUnifie;

/// La longueur en bits d'une constante est celle de sa représentation
/// rationnelle ou entière normalisée. Les comptes d'opérateurs incluent
/// les constantes π et e.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Statistiques {
    /// Nombre total de +, −, ×, et de constantes π et e.
    pub nb_ops_communes: u32,
    /// Nombre total d'opérateurs.
    pub nb_ops: u32,
    /// Invocations de fonctions trigonométriques, exponentielles, log.
    pub fonctions_transcendantes: u32,
    /// Longueur totale en bits de toutes les constantes.
    pub bits_constantes_total: u64,
    /// Longueur des constantes en argument de √ et consorts.
    pub bits_constante_interessante: u64,
    /// Nombre de points décimaux ou d'exposants dans les constantes.
    pub nb_decimales: u32,
}

impl Statistiques {
    pub fn nb_ops_rares(&self) -> u32 {
        self.nb_ops - self.nb_ops_communes
    }

    pub fn ajouter(&mut self, autre: &Statistiques) {
        self.nb_ops_communes += autre.nb_ops_communes;
        self.nb_ops += autre.nb_ops;
        self.fonctions_transcendantes += autre.fonctions_transcendantes;
        self.bits_constantes_total += autre.bits_constantes_total;
        self.bits_constante_interessante += autre.bits_constante_interessante;
        self.nb_decimales += autre.nb_decimales;
    }
}

impl ReelUnifie {
    /// Statistiques de l'expression rendue par jolie_chaine(). Suppose
    /// affichable_exactement().
    pub fn statistiques(&self, degres: bool) -> Statistiques {
        let mut resultat = Statistiques::default();
        let normalise = self.rationnel.reduire();
        let entier = normalise.en_entier();
        resultat.bits_constantes_total = match &entier {
            Some(n) => n.bits(),
            None => normalise.longueur_bits(),
        };
        resultat.nb_ops = if entier.is_some() { 0 } else { 1 };
        let propriete = match &self.propriete {
            None | Some(Propriete::Irrationnel) => return resultat,
            Some(p) => p,
        };
        match propriete {
            Propriete::Un | Propriete::Irrationnel => {}
            Propriete::Pi => {
                resultat.nb_ops += 1;
                resultat.nb_ops_communes += 1;
            }
            Propriete::Exp(arg) if arg.est_un() => {
                // affiché "e"
                resultat.nb_ops += 1;
                resultat.nb_ops_communes += 1;
            }
            Propriete::Exp(arg)
            | Propriete::Ln(arg)
            | Propriete::Log(arg)
            | Propriete::SinPi(arg)
            | Propriete::TanPi(arg)
            | Propriete::Asin(arg)
            | Propriete::Atan(arg)
            | Propriete::Racine(arg) => {
                if !matches!(propriete, Propriete::Racine(_)) {
                    resultat.fonctions_transcendantes += 1;
                }
                let trig_pi =
                    matches!(propriete, Propriete::SinPi(_) | Propriete::TanPi(_));
                let arg_affiche = if degres && trig_pi {
                    // l'argument sera converti en degrés à l'affichage
                    arg.multiplier(&RationnelBorne::cent_quatre_vingts())
                        .map(|r| r.reduire())
                        .unwrap_or_else(|| arg.clone())
                } else {
                    arg.clone()
                };
                let arg_entier = arg_affiche.en_entier();
                let bits_arg = match &arg_entier {
                    Some(n) => n.bits(),
                    None => arg_affiche.longueur_bits(),
                };
                resultat.bits_constantes_total += bits_arg;
                resultat.bits_constante_interessante = bits_arg;
                // 1 pour la fonction principale, peut-être 1 pour le quotient
                resultat.nb_ops += if arg_entier.is_some() { 1 } else { 2 };
                let trig_inverse =
                    matches!(propriete, Propriete::Asin(_) | Propriete::Atan(_));
                if degres {
                    if trig_inverse {
                        // conversion disgracieuse ajoutée à l'affichage
                        resultat.bits_constantes_total += 8; // la constante 180
                        resultat.nb_ops += 3; // multiplication, division, π
                    }
                } else {
                    // l'expression affichée porte un π derrière l'argument
                    resultat.nb_ops += 1;
                }
            }
        }
        resultat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rationnel_pur_sans_operation() {
        let s = ReelUnifie::depuis_i64(42).statistiques(false);
        assert_eq!(s.nb_ops, 0);
        assert_eq!(s.bits_constantes_total, 6);
        assert_eq!(s.nb_ops_rares(), 0);
    }

    #[test]
    fn pi_est_une_operation_commune() {
        let s = ReelUnifie::pi().statistiques(false);
        assert_eq!(s.nb_ops, 1);
        assert_eq!(s.nb_ops_communes, 1);
        assert_eq!(s.fonctions_transcendantes, 0);
    }

    #[test]
    fn racine_compte_son_argument() {
        let racine12 = ReelUnifie::depuis_i64(12).racine_carree().unwrap();
        let s = racine12.statistiques(false);
        // argument 3 de la racine : constante "intéressante"
        assert_eq!(s.bits_constante_interessante, 2);
        assert_eq!(s.fonctions_transcendantes, 0);
        assert!(s.nb_ops >= 1);
    }

    #[test]
    fn cumul() {
        let mut total = ReelUnifie::pi().statistiques(false);
        total.ajouter(&ReelUnifie::e().statistiques(false));
        assert_eq!(total.nb_ops_communes, 2);
    }
}
