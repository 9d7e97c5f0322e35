use std::io::{self, Read};

/// Helper function to read a secret from the terminal without echo
pub fn read_password() -> io::Result<String> {
    rpassword::read_password()
}

/// Read a JSON event either from a file or, when no path is given, from stdin
pub fn read_event_source(path: Option<&str>) -> io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

/// Helper function to validate email format
pub fn is_valid_email(email: &str) -> bool {
    // Basic email validation
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
        && !domain.contains('@')
        && email.len() >= 5
}

/// Mask an address for untrusted channels: `alice@example.com` -> `a***@example.com`
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first: String = local.chars().take(1).collect();
            format!("{}***@{}", first, domain)
        }
        None => "***".to_string(),
    }
}
