//! Role tag normalization
//!
//! Producers disagree on how multiple roles are joined: instance tags use
//! `", "` while the hosts file and newer tags use `-`. Everything goes
//! through [`split_roles`] before it reaches a `HostRecord`.

/// Split a multi-valued role tag into individual role names.
///
/// Accepts `-`, `,` and whitespace as separators, drops empty pieces and
/// duplicates, and keeps first-seen order.
pub fn split_roles(raw: &str) -> Vec<String> {
    let mut roles: Vec<String> = Vec::new();
    for piece in raw.split(|c: char| c == '-' || c == ',' || c.is_whitespace()) {
        if piece.is_empty() {
            continue;
        }
        if !roles.iter().any(|r| r == piece) {
            roles.push(piece.to_string());
        }
    }
    roles
}

/// Join roles the way the hosts file stores them.
pub fn join_roles<S: AsRef<str>>(roles: &[S]) -> String {
    roles
        .iter()
        .map(|r| r.as_ref())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_hyphen_joined() {
        assert_eq!(split_roles("app-worker"), vec!["app", "worker"]);
    }

    #[test]
    fn splits_comma_joined() {
        assert_eq!(split_roles("app, worker"), vec!["app", "worker"]);
        assert_eq!(split_roles("app,worker"), vec!["app", "worker"]);
    }

    #[test]
    fn drops_empty_and_duplicate_pieces() {
        assert_eq!(split_roles("-app--app-"), vec!["app"]);
        assert!(split_roles("").is_empty());
    }

    #[test]
    fn join_uses_hyphen() {
        assert_eq!(join_roles(&["app", "worker"]), "app-worker");
    }
}
