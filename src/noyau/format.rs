// src/noyau/format.rs
//
// Affichage "joli" : fractions lisibles (exposants Unicode en option,
// fractions mixtes en option), formes symboliques fermées (2√3, sin(π/6),
// e, ln(10)…) quand la propriété en fournit une, repli décimal sinon, et
// troncatures décimales contrôlées.

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

use super::erreur::Resultat;
use super::proprietes::Propriete;
use super::rationnel::{signe, RationnelBorne};
use super::reel::Reel;
use super::reel_unifie::ReelUnifie;

// BARRE_FRACTION devrait fondre les chiffres qui l'entourent en fraction ;
// ça ne marche pas partout, mais là où ça marche la conversion en
// exposants/indices est implicite. Le moins de tête reste mieux rendu en
// exposant explicite.
const BARRE_FRACTION: char = '\u{2044}';
const MOINS_EXPOSANT: &str = "\u{207B}";
const CHAINE_PI: &str = "\u{03C0}";
const CHAINE_RACINE: &str = "\u{221A}";
const CHAINE_FOIS: &str = "\u{00D7}";
const CHAINE_INVERSE: &str = "\u{207B}\u{00B9}"; // exposant -1
const PREC_SUPP: u32 = 10; // bits en plus pour préférer la troncature à l'arrondi

/* ------------------------ rationnels ------------------------ */

impl RationnelBorne {
    /// (numérateur, dénominateur) sous forme réduite, dénominateur positif.
    pub fn num_den(&self) -> (BigInt, BigInt) {
        let propre = self.reduire().den_positif();
        (propre.num, propre.den)
    }

    /// Écriture lisible, destinée à l'utilisateur. Plus chère et moins
    /// utile au débogage que Display. Avec `mixte`, les fractions impropres
    /// deviennent mixtes ; avec `exposants`, la fraction est rendue via les
    /// caractères Unicode prévus pour ça (non internationalisé).
    pub fn jolie_chaine(&self, exposants: bool, mixte: bool) -> String {
        let (num_signe, den) = self.num_den();
        let negatif = signe(&num_signe) < 0;
        let mut num = num_signe.abs();
        let mut entier: Option<BigInt> = None;
        if den.is_one() {
            entier = Some(num.clone());
            num = BigInt::zero();
        } else if mixte && num >= den {
            entier = Some(&num / &den);
            num = &num % &den;
        }
        let moins = if negatif {
            if entier.is_none() && exposants {
                MOINS_EXPOSANT
            } else {
                "-"
            }
        } else {
            ""
        };
        let mut resultat = String::from(moins);
        if let Some(e) = &entier {
            resultat.push_str(&e.to_string());
        }
        // num == 0 implique une partie entière renseignée
        if num.is_zero() {
            return resultat;
        }
        if entier.is_some() {
            resultat.push(' '); // séparateur requis
        }
        resultat.push_str(&num.to_string());
        if exposants {
            resultat.push(BARRE_FRACTION);
        } else {
            resultat.push('/');
        }
        resultat.push_str(&den.to_string());
        resultat
    }

    /// Troncature vers zéro, n chiffres à droite du point, point toujours
    /// présent.
    pub fn chaine_tronquee(&self, n: u32) -> String {
        let dix_puissance = BigInt::from(10).pow(n);
        let mut chiffres = ((self.num.abs() * dix_puissance) / self.den.abs()).to_string();
        if chiffres.len() < n as usize + 1 {
            let zeros = "0".repeat(n as usize + 1 - chiffres.len());
            chiffres = format!("{zeros}{chiffres}");
        }
        let coupe = chiffres.len() - n as usize;
        format!(
            "{}{}.{}",
            if self.signum() < 0 { "-" } else { "" },
            &chiffres[..coupe],
            &chiffres[coupe..]
        )
    }
}

/* ------------------------ multiples de π ------------------------ */

// Décrit r·π radians ; en mode degrés, la même grandeur en degrés.
fn symbole_pi_multiple(r: &RationnelBorne, degres: bool, exposants: bool) -> String {
    if degres {
        match r.multiplier(&RationnelBorne::cent_quatre_vingts()) {
            Some(en_degres) => en_degres.jolie_chaine(exposants, false),
            None => {
                // Très improbable, et le résultat n'est pas bien utile :
                // énorme, pas forcément réduit, laid — mais juste.
                let (num, den) = r.num_den();
                format!("{}/{}", num * BigInt::from(180), den)
            }
        }
    } else {
        let (num, den) = r.num_den();
        if den.is_one() {
            format!("{num}{CHAINE_PI}")
        } else if exposants && !num.is_one() {
            format!("{}{}", r.jolie_chaine(true, false), CHAINE_PI)
        } else if num.is_one() {
            format!("{CHAINE_PI}/{den}")
        } else {
            format!("{num}{CHAINE_PI}/{den}")
        }
    }
}

// Écriture symbolique du facteur constructif, à accoler au multiplicateur
// rationnel — d'où la chaîne vide pour Un. None quand on ne sait pas.
fn symbole_reel(p: Option<&Propriete>, degres: bool, exposants: bool) -> Option<String> {
    let conversion_degres = format!("{CHAINE_FOIS}180/{CHAINE_PI}");
    match p? {
        Propriete::Irrationnel => None,
        Propriete::Un => Some(String::new()),
        Propriete::Pi => Some(CHAINE_PI.to_string()),
        Propriete::Exp(arg) => Some(if arg.est_un() {
            "e".to_string()
        } else {
            format!("exp({})", arg.jolie_chaine(exposants, false))
        }),
        Propriete::Racine(arg) => Some(match arg.en_entier() {
            Some(entier) => format!("{CHAINE_RACINE}{entier}"),
            None => format!("{CHAINE_RACINE}({})", arg.jolie_chaine(exposants, false)),
        }),
        Propriete::Ln(arg) => Some(format!("ln({})", arg.jolie_chaine(exposants, false))),
        Propriete::Log(arg) => Some(format!("log({})", arg.jolie_chaine(exposants, false))),
        Propriete::SinPi(arg) => Some(format!(
            "sin({})",
            symbole_pi_multiple(arg, degres, exposants)
        )),
        Propriete::TanPi(arg) => Some(format!(
            "tan({})",
            symbole_pi_multiple(arg, degres, exposants)
        )),
        Propriete::Asin(arg) => Some(format!(
            "sin{CHAINE_INVERSE}({}){}",
            arg.jolie_chaine(exposants, false),
            if degres { &conversion_degres } else { "" }
        )),
        Propriete::Atan(arg) => Some(format!(
            "tan{CHAINE_INVERSE}({}){}",
            arg.jolie_chaine(exposants, false),
            if degres { &conversion_degres } else { "" }
        )),
    }
}

/* ------------------------ réels unifiés ------------------------ */

impl ReelUnifie {
    /// Écriture lisible, exacte dès que possible. En mode degrés, les
    /// fonctions trigonométriques affichées sont les versions en degrés.
    /// Peut déclencher une évaluation décimale en dernier recours.
    pub fn jolie_chaine(&self, degres: bool, exposants: bool, mixte: bool) -> Resultat<String> {
        if matches!(&self.propriete, Some(p) if p.est_un()) || self.rationnel.signum() == 0 {
            return Ok(self.rationnel.jolie_chaine(exposants, mixte));
        }
        if let Some(symbole) = symbole_reel(self.propriete.as_ref(), degres, exposants) {
            if let Some(entier) = self.rationnel.en_entier() {
                if entier.is_one() {
                    return Ok(symbole);
                }
                if entier == BigInt::from(-1) {
                    return Ok(format!("-{symbole}"));
                }
                return Ok(format!("{entier}{symbole}"));
            }
            let inverse_entier = self.rationnel.inverse()?.en_entier();
            if let Some(inverse) = inverse_entier {
                let signe_txt = if signe(&inverse) < 0 { "-" } else { "" };
                // espaces pour limiter l'ambiguïté avec les racines ;
                // inutiles pour les constantes d'un caractère (π/6, e/2)
                let barre = if symbole == CHAINE_PI || symbole == "e" {
                    "/"
                } else {
                    " / "
                };
                return Ok(format!("{signe_txt}{symbole}{barre}{}", inverse.abs()));
            }
            if exposants {
                return Ok(format!(
                    "{}{symbole}",
                    self.rationnel.jolie_chaine(true, false)
                ));
            }
            return Ok(format!(
                "({}){symbole}",
                self.rationnel.jolie_chaine(false, false)
            ));
        }
        if self.rationnel.est_un() {
            return self.reel.chaine(10);
        }
        self.valeur_reelle().chaine(10)
    }

    /// Troncature décimale, n chiffres à droite du point, toujours avec un
    /// point. Vers zéro quand troncature_exacte() ; sinon le dernier
    /// chiffre peut monter d'une unité.
    pub fn chaine_decimale(&self, n: u32) -> Resultat<String> {
        if matches!(&self.propriete, Some(p) if p.est_un()) || self.rationnel.signum() == 0 {
            return Ok(self.rationnel.chaine_tronquee(n));
        }
        let cadre = Reel::depuis_entier(BigInt::from(10).pow(n)).multiplier(&self.valeur_reelle());
        let mut negatif = false;
        let mut entier_cadre;
        if self.troncature_exacte() {
            entier_cadre = cadre.approx(0)?;
            if signe(&entier_cadre) < 0 {
                negatif = true;
                entier_cadre = -entier_cadre;
            }
            // corriger le demi-ulp d'arrondi : la valeur affichée doit
            // rester sous la vraie (la comparaison converge, l'égalité
            // exacte étant exclue sur ce chemin)
            if Reel::depuis_entier(entier_cadre.clone()).comparer(&cadre.abs())? > 0 {
                entier_cadre -= 1;
            }
        } else {
            // cas approché : les comparaisons exactes sont impossibles
            entier_cadre = cadre.approx(-(PREC_SUPP as i32))?;
            if signe(&entier_cadre) < 0 {
                negatif = true;
                entier_cadre = -entier_cadre;
            }
            entier_cadre >>= PREC_SUPP as usize;
        }
        let mut chiffres = entier_cadre.to_string();
        if chiffres.len() < n as usize + 1 {
            let zeros = "0".repeat(n as usize + 1 - chiffres.len());
            chiffres = format!("{zeros}{chiffres}");
        }
        let coupe = chiffres.len() - n as usize;
        Ok(format!(
            "{}{}.{}",
            if negatif { "-" } else { "" },
            &chiffres[..coupe],
            &chiffres[coupe..]
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractions_jolies() {
        let r = RationnelBorne::fraction(7, 2);
        assert_eq!(r.jolie_chaine(false, false), "7/2");
        assert_eq!(r.jolie_chaine(false, true), "3 1/2");
        let negatif = RationnelBorne::fraction(-3, 4);
        assert_eq!(negatif.jolie_chaine(false, false), "-3/4");
        assert_eq!(RationnelBorne::entier(5).jolie_chaine(false, false), "5");
    }

    #[test]
    fn troncature_rationnelle() {
        assert_eq!(RationnelBorne::fraction(1, 3).chaine_tronquee(5), "0.33333");
        assert_eq!(RationnelBorne::fraction(-1, 3).chaine_tronquee(3), "-0.333");
        assert_eq!(RationnelBorne::entier(2).chaine_tronquee(2), "2.00");
    }

    #[test]
    fn racine_de_douze_affichee_2_racine_3() {
        let racine12 = ReelUnifie::depuis_i64(12).racine_carree().unwrap();
        assert_eq!(racine12.jolie_chaine(false, false, false).unwrap(), "2√3");
        assert_eq!(racine12.chaine_decimale(5).unwrap(), "3.46410");
    }

    #[test]
    fn angles_en_radians_et_degres() {
        // asin(1/2) : π/6 en radians, 30 en degrés
        let asin_moitie = ReelUnifie::moitie().arcsinus().unwrap();
        assert_eq!(
            asin_moitie.jolie_chaine(false, false, false).unwrap(),
            "π/6"
        );
        let en_degres = asin_moitie
            .diviser(&ReelUnifie::radians_par_degre())
            .unwrap();
        assert_eq!(en_degres.jolie_chaine(true, false, false).unwrap(), "30");
    }

    #[test]
    fn constantes_symboliques() {
        assert_eq!(
            ReelUnifie::pi().jolie_chaine(false, false, false).unwrap(),
            "π"
        );
        assert_eq!(
            ReelUnifie::e().jolie_chaine(false, false, false).unwrap(),
            "e"
        );
        assert_eq!(
            ReelUnifie::ln10().jolie_chaine(false, false, false).unwrap(),
            "ln(10)"
        );
        // sin(π/5) résiste à la simplification : rendu symbolique
        let sin_pi_5 = ReelUnifie::pi()
            .multiplier(&ReelUnifie::depuis_rationnel(RationnelBorne::fraction(1, 5)))
            .unwrap()
            .sinus()
            .unwrap();
        assert_eq!(
            sin_pi_5.jolie_chaine(false, false, false).unwrap(),
            "sin(π/5)"
        );
    }

    #[test]
    fn troncature_pi() {
        assert_eq!(ReelUnifie::pi().chaine_decimale(5).unwrap(), "3.14159");
        assert_eq!(
            ReelUnifie::pi().negation().chaine_decimale(3).unwrap(),
            "-3.141"
        );
    }

    #[test]
    fn inverse_de_racine_affiche_en_quotient() {
        // 1/√2 = √2/2 : rendu "√2 / 2"
        let inverse_racine2 = ReelUnifie::depuis_i64(2)
            .racine_carree()
            .unwrap()
            .inverse()
            .unwrap();
        assert_eq!(
            inverse_racine2.jolie_chaine(false, false, false).unwrap(),
            "√2 / 2"
        );
    }
}
