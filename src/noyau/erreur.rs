// src/noyau/erreur.rs
//
// Taxonomie d'erreurs fermée du noyau.
//
// Politique de propagation :
// - les limites de TAILLE (rationnel trop gros, pas de racine exacte) ne sont
//   PAS des erreurs : elles se propagent en Option::None et le caller retombe
//   sur l'évaluation numérique ;
// - les échecs DURS (domaine, division par zéro, annulation, débordement de
//   précision) sont des `Erreur` et remontent par `?`, jamais avalés.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Erreur {
    /// Une demande de précision interne a dépassé la marge de sécurité
    /// (~28 bits de tête sur un i32). Signe quasi certain d'un calcul
    /// divergent, ex: division par un zéro non reconnu.
    #[error("débordement de précision")]
    DebordementPrecision,

    /// Annulation coopérative observée en cours de calcul.
    #[error("calcul annulé")]
    Annule,

    /// Entrée mathématiquement indéfinie (ln d'un négatif, asin hors [-1,1],
    /// tan(π/2), factorielle non entière…).
    #[error("hors domaine : {0}")]
    Domaine(&'static str),

    /// Division par un opérande connu exactement nul.
    #[error("division par zéro")]
    DivisionParZero,

    /// 0^0 dont la nullité de la base a dû être résolue par évaluation.
    #[error("0^0")]
    ZeroPuissanceZero,

    /// Résultat impraticable (exponentiation ou factorielle astronomique).
    #[error("résultat trop grand : {0}")]
    TropGrand(&'static str),
}

pub type Resultat<T> = Result<T, Erreur>;

/// Précision en bits à droite du point binaire (négatif = à gauche).
pub type Precision = i32;

/// Vérifie qu'une précision reste à un facteur 8 du débordement i32.
/// On fait ce contrôle tôt, puis on se convainc que l'arithmétique de
/// précisions à l'intérieur d'une fonction ne peut plus déborder.
pub fn verifier_prec(p: Precision) -> Resultat<()> {
    // si p est loin du débordement, les 4 bits hauts sont identiques
    let haut = p >> 28;
    let haut_decale = p >> 29;
    if haut ^ haut_decale != 0 {
        Err(Erreur::DebordementPrecision)
    } else {
        Ok(())
    }
}

/// Plafond de log2(|n|+1). Utilisé pour borner l'erreur cumulée d'une série
/// en fonction du nombre de termes.
pub(crate) fn borne_log2(n: i32) -> i32 {
    let x = u64::from((n as i64).unsigned_abs() as u32) + 1;
    (64 - (x - 1).leading_zeros()) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifier_prec_bornes() {
        assert!(verifier_prec(0).is_ok());
        assert!(verifier_prec(-100_000).is_ok());
        assert!(verifier_prec(100_000).is_ok());
        assert!(verifier_prec(i32::MAX).is_err());
        assert!(verifier_prec(i32::MIN).is_err());
        assert!(verifier_prec(1 << 28).is_err());
    }

    #[test]
    fn borne_log2_petits() {
        assert_eq!(borne_log2(0), 0);
        assert_eq!(borne_log2(1), 1);
        assert_eq!(borne_log2(3), 2);
        assert_eq!(borne_log2(-3), 2);
        assert_eq!(borne_log2(4), 3); // plafond(log2(5))
    }
}
