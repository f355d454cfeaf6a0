//! Static rule → category → weakness lookup.
//!
//! Compiled into the binary rather than loaded at runtime: the mapping
//! changes with releases, not with data. Unknown rule ids resolve to
//! the `Unknown` sentinel category, never an error: a scan must not
//! drop findings for rules the table has not caught up with.

use crate::constants::UNKNOWN_CATEGORY_ID;

/// The category and weakness ids a scanner rule maps to.
/// The first weakness id is the primary one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMapping {
    pub category_id: &'static str,
    pub weakness_ids: &'static [&'static str],
}

/// Resolve a rule id. Total: unknown rules map to the sentinel.
pub fn lookup(rule_id: &str) -> RuleMapping {
    match rule_id {
        "sql-injection" | "sqli-blind" | "sqli-time-based" => RuleMapping {
            category_id: "A03:injection",
            weakness_ids: &["CWE-89"],
        },
        "command-injection" => RuleMapping {
            category_id: "A03:injection",
            weakness_ids: &["CWE-78", "CWE-77"],
        },
        "xss-reflected" | "xss-stored" | "xss-dom" => RuleMapping {
            category_id: "A03:injection",
            weakness_ids: &["CWE-79"],
        },
        "ldap-injection" => RuleMapping {
            category_id: "A03:injection",
            weakness_ids: &["CWE-90"],
        },
        "path-traversal" => RuleMapping {
            category_id: "A01:broken-access-control",
            weakness_ids: &["CWE-22"],
        },
        "idor" | "missing-authz" => RuleMapping {
            category_id: "A01:broken-access-control",
            weakness_ids: &["CWE-639", "CWE-862"],
        },
        "csrf" => RuleMapping {
            category_id: "A01:broken-access-control",
            weakness_ids: &["CWE-352"],
        },
        "weak-crypto" | "weak-hash" => RuleMapping {
            category_id: "A02:cryptographic-failures",
            weakness_ids: &["CWE-327", "CWE-328"],
        },
        "cleartext-transmission" => RuleMapping {
            category_id: "A02:cryptographic-failures",
            weakness_ids: &["CWE-319"],
        },
        "hardcoded-secret" => RuleMapping {
            category_id: "A07:auth-failures",
            weakness_ids: &["CWE-798"],
        },
        "weak-session" | "session-fixation" => RuleMapping {
            category_id: "A07:auth-failures",
            weakness_ids: &["CWE-384", "CWE-613"],
        },
        "xxe" => RuleMapping {
            category_id: "A05:security-misconfiguration",
            weakness_ids: &["CWE-611"],
        },
        "open-redirect" => RuleMapping {
            category_id: "A01:broken-access-control",
            weakness_ids: &["CWE-601"],
        },
        "ssrf" => RuleMapping {
            category_id: "A10:ssrf",
            weakness_ids: &["CWE-918"],
        },
        "insecure-deserialization" => RuleMapping {
            category_id: "A08:integrity-failures",
            weakness_ids: &["CWE-502"],
        },
        "vulnerable-dependency" => RuleMapping {
            category_id: "A06:vulnerable-components",
            weakness_ids: &["CWE-1104"],
        },
        "verbose-errors" | "stack-trace-leak" => RuleMapping {
            category_id: "A05:security-misconfiguration",
            weakness_ids: &["CWE-209"],
        },
        "missing-security-headers" => RuleMapping {
            category_id: "A05:security-misconfiguration",
            weakness_ids: &["CWE-693"],
        },
        _ => RuleMapping {
            category_id: UNKNOWN_CATEGORY_ID,
            weakness_ids: &[],
        },
    }
}

/// The category catalog seeded into a fresh knowledge store.
pub fn category_catalog() -> Vec<(&'static str, &'static str, &'static str)> {
    vec![
        (
            "A01:broken-access-control",
            "Broken Access Control",
            "Restrictions on what authenticated users are allowed to do are not properly enforced.",
        ),
        (
            "A02:cryptographic-failures",
            "Cryptographic Failures",
            "Failures related to cryptography that often lead to exposure of sensitive data.",
        ),
        (
            "A03:injection",
            "Injection",
            "User-supplied data is not validated, filtered, or sanitized and reaches an interpreter.",
        ),
        (
            "A05:security-misconfiguration",
            "Security Misconfiguration",
            "Insecure default configurations, incomplete setups, verbose errors, or missing hardening.",
        ),
        (
            "A06:vulnerable-components",
            "Vulnerable and Outdated Components",
            "Use of components with known vulnerabilities or unsupported versions.",
        ),
        (
            "A07:auth-failures",
            "Identification and Authentication Failures",
            "Confirmation of user identity, authentication, and session management weaknesses.",
        ),
        (
            "A08:integrity-failures",
            "Software and Data Integrity Failures",
            "Code and infrastructure that do not protect against integrity violations.",
        ),
        (
            "A10:ssrf",
            "Server-Side Request Forgery",
            "The server fetches a remote resource without validating the user-supplied URL.",
        ),
        (
            UNKNOWN_CATEGORY_ID,
            "Unknown",
            "Findings whose rule is not present in the static taxonomy table.",
        ),
    ]
}

/// The weakness catalog seeded into a fresh knowledge store:
/// (id, name, description, mitigation).
pub fn weakness_catalog() -> Vec<(&'static str, &'static str, &'static str, &'static str)> {
    vec![
        (
            "CWE-89",
            "SQL Injection",
            "SQL commands constructed from user input without neutralization.",
            "Use parameterized queries or prepared statements; never concatenate input into SQL.",
        ),
        (
            "CWE-79",
            "Cross-site Scripting",
            "User input reflected into pages without output encoding.",
            "Contextually encode all output; apply a strict Content-Security-Policy.",
        ),
        (
            "CWE-78",
            "OS Command Injection",
            "Shell commands constructed from user input.",
            "Avoid shelling out; if unavoidable, use argument vectors and allow-lists.",
        ),
        (
            "CWE-77",
            "Command Injection",
            "Command strings built from externally-influenced input.",
            "Validate against an allow-list and pass arguments positionally.",
        ),
        (
            "CWE-22",
            "Path Traversal",
            "File paths built from user input escaping the intended directory.",
            "Canonicalize paths and verify containment before access.",
        ),
        (
            "CWE-90",
            "LDAP Injection",
            "LDAP queries constructed from unsanitized input.",
            "Escape LDAP metacharacters and use safe query builders.",
        ),
        (
            "CWE-352",
            "Cross-Site Request Forgery",
            "State-changing requests accepted without origin verification.",
            "Require anti-CSRF tokens and SameSite cookies.",
        ),
        (
            "CWE-639",
            "Authorization Bypass Through User-Controlled Key",
            "Object references taken from the client without ownership checks.",
            "Check object ownership server-side on every access.",
        ),
        (
            "CWE-862",
            "Missing Authorization",
            "Sensitive operations reachable without an authorization check.",
            "Enforce authorization at a single choke point for every route.",
        ),
        (
            "CWE-327",
            "Broken or Risky Cryptographic Algorithm",
            "Deprecated or weak cryptographic primitives in use.",
            "Use modern, vetted algorithms and library defaults.",
        ),
        (
            "CWE-328",
            "Use of Weak Hash",
            "Collision-prone hash functions protecting integrity or passwords.",
            "Use SHA-256 or better for integrity; a memory-hard KDF for passwords.",
        ),
        (
            "CWE-319",
            "Cleartext Transmission of Sensitive Information",
            "Sensitive data sent without transport encryption.",
            "Require TLS everywhere; enable HSTS.",
        ),
        (
            "CWE-798",
            "Use of Hard-coded Credentials",
            "Secrets embedded in source or configuration artifacts.",
            "Move secrets to a managed secret store; rotate anything committed.",
        ),
        (
            "CWE-384",
            "Session Fixation",
            "Session identifiers preserved across privilege changes.",
            "Regenerate the session id on every login.",
        ),
        (
            "CWE-613",
            "Insufficient Session Expiration",
            "Sessions that outlive their safe lifetime.",
            "Expire sessions server-side on timeout and logout.",
        ),
        (
            "CWE-611",
            "XML External Entity Reference",
            "XML parsers resolving external entities from untrusted documents.",
            "Disable DTD and external entity resolution in the parser.",
        ),
        (
            "CWE-601",
            "Open Redirect",
            "Redirect targets taken from unvalidated input.",
            "Allow-list redirect destinations or use indirect mapping.",
        ),
        (
            "CWE-918",
            "Server-Side Request Forgery",
            "The server fetches attacker-chosen URLs.",
            "Allow-list outbound destinations and block link-local ranges.",
        ),
        (
            "CWE-502",
            "Deserialization of Untrusted Data",
            "Native deserialization of attacker-controlled bytes.",
            "Use data-only formats; never deserialize code or object graphs from input.",
        ),
        (
            "CWE-1104",
            "Use of Unmaintained Third Party Components",
            "Dependencies past end-of-life or with known vulnerabilities.",
            "Track dependencies and patch on a fixed cadence.",
        ),
        (
            "CWE-209",
            "Information Exposure Through Error Messages",
            "Stack traces or internals leaked to clients.",
            "Return generic errors; log details server-side only.",
        ),
        (
            "CWE-693",
            "Protection Mechanism Failure",
            "Missing or disabled defensive headers and mechanisms.",
            "Set the standard security headers on every response.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_rule_resolves() {
        let mapping = lookup("sql-injection");
        assert_eq!(mapping.category_id, "A03:injection");
        assert_eq!(mapping.weakness_ids, &["CWE-89"]);
    }

    #[test]
    fn unknown_rule_maps_to_sentinel_not_error() {
        let mapping = lookup("some-brand-new-rule");
        assert_eq!(mapping.category_id, UNKNOWN_CATEGORY_ID);
        assert!(mapping.weakness_ids.is_empty());
    }

    #[test]
    fn every_mapped_category_is_in_the_catalog() {
        let catalog: Vec<&str> = category_catalog().iter().map(|(id, _, _)| *id).collect();
        for rule in [
            "sql-injection",
            "command-injection",
            "xss-stored",
            "path-traversal",
            "idor",
            "csrf",
            "weak-crypto",
            "cleartext-transmission",
            "hardcoded-secret",
            "weak-session",
            "xxe",
            "open-redirect",
            "ssrf",
            "insecure-deserialization",
            "vulnerable-dependency",
            "verbose-errors",
            "missing-security-headers",
            "not-a-rule",
        ] {
            let mapping = lookup(rule);
            assert!(
                catalog.contains(&mapping.category_id),
                "{rule} maps to uncataloged category {}",
                mapping.category_id
            );
        }
    }
}
