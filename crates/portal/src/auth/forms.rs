//! Fixed form payloads of the two-step login.

/// Fields posted to the login endpoint to obtain the keypad page.
pub(crate) fn keypad_request(bank_url: &str) -> Vec<(&'static str, String)> {
    vec![
        ("TOP_ORIGINE", "V".to_string()),
        ("vitrine", "O".to_string()),
        ("largeur_ecran", "800".to_string()),
        ("hauteur_ecran", "600".to_string()),
        ("origine", "vitrine".to_string()),
        ("situationTravail", "BANQUAIRE".to_string()),
        ("canal", "WEB".to_string()),
        ("typeAuthentification", "CLIC_ALLER".to_string()),
        ("urlOrigine", bank_url.to_string()),
        ("tracking", "O".to_string()),
    ]
}

/// Hidden inputs of the keypad page echoed back with the credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenFields {
    pub id_unique: String,
    pub caisse: String,
}

/// Credential submission: the secret travels as keypad codes only.
pub(crate) fn credential_submission(
    hidden: &HiddenFields,
    encoded_secret: String,
    login: &str,
) -> Vec<(&'static str, String)> {
    vec![
        ("idtcm", String::new()),
        ("tracking", "O".to_string()),
        ("origine", "vitrine".to_string()),
        ("situationTravail", "BANCAIRE".to_string()),
        ("canal", "WEB".to_string()),
        ("typeAuthentification", "CLIC_RETOUR".to_string()),
        ("idUnique", hidden.id_unique.clone()),
        ("caisse", hidden.caisse.clone()),
        ("CCCRYC", encoded_secret),
        ("CCCRYC2", "000000".to_string()),
        ("CCPTE", login.to_string()),
    ]
}
