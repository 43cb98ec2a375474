//! Calculatrice réelle — noyau d'arithmétique réelle exacte/symbolique.
//!
//! Un réel y est le produit d'un rationnel borné (arithmétique de
//! fractions exacte, avec plafond de taille) et d'un réel constructif
//! (fonction précision → approximation correctement bornée), ce dernier
//! étiqueté d'une forme symbolique (π, √n, ln r, sin(π·r)…) dès qu'elle
//! est reconnaissable. L'étiquette rend exactes beaucoup de comparaisons,
//! d'égalités et de questions « est-ce rationnel ? » qu'aucune
//! approximation numérique ne pourrait trancher.
//!
//! ATTENTION : une comparaison entre deux valeurs réellement égales et non
//! reconnues telles par le système de propriétés DIVERGE (précision
//! croissante sans fin, jusqu'au débordement de précision). C'est une
//! propriété intrinsèque des réels constructifs, pas un défaut ;
//! l'appelant impose son propre délai via le jeton d'annulation.
//!
//! ```
//! use calculatrice_reelle::ReelUnifie;
//!
//! let racine12 = ReelUnifie::depuis_i64(12).racine_carree().unwrap();
//! assert_eq!(racine12.jolie_chaine(false, false, false).unwrap(), "2√3");
//! assert_eq!(racine12.chaine_decimale(5).unwrap(), "3.46410");
//! ```

pub mod noyau;

pub use noyau::{
    avec_jeton, Erreur, FonctionReelle, JetonAnnulation, Precision, Propriete, RationnelBorne,
    Reel, ReelUnifie, RepresentationFlottante, Resultat, Statistiques,
};
