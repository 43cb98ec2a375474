//! Noyau d'arithmétique réelle exacte
//!
//! Organisation interne :
//! - erreur.rs      : taxonomie d'erreurs + garde de précision
//! - annulation.rs  : jeton d'annulation coopératif à portée
//! - reel.rs        : réels constructifs (DAG de noeuds + cache)
//! - series.rs      : noyaux de Taylor pré-cadrés (exp, cos, ln, asin, atan)
//! - racine.rs      : racine carrée (Newton) + π de Gauss–Legendre
//! - fonctions.rs   : fonctions unaires, inverse monotone, dérivée
//! - rationnel.rs   : rationnels bornés (exacts, plafond de taille)
//! - proprietes.rs  : formes symboliques + indépendance algébrique
//! - reel_unifie.rs : couche unifiée rationnel × constructif × propriété
//! - format.rs      : affichage joli (2√3, sin(π/6)…) + troncatures
//! - stats.rs       : résumé de complexité pour l'affichage

pub mod annulation;
pub mod erreur;
pub mod fonctions;
pub mod format;
pub mod proprietes;
pub mod racine;
pub mod rationnel;
pub mod reel;
pub mod reel_unifie;
pub mod series;
pub mod stats;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_fuzz_safe;

// API publique minimale
pub use annulation::{avec_jeton, JetonAnnulation};
pub use erreur::{Erreur, Precision, Resultat};
pub use fonctions::FonctionReelle;
pub use proprietes::Propriete;
pub use rationnel::RationnelBorne;
pub use reel::{Reel, RepresentationFlottante};
pub use reel_unifie::ReelUnifie;
pub use stats::Statistiques;
