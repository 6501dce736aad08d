//! Hostname classification: root site vs. tenant site.
//!
//! Pure string logic. Labels are not validated and punycode/IDN hosts are
//! treated like any other string.

/// What a request's hostname addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostKind {
    /// The apex domain, a reserved alias of it (`www.`), or `localhost`.
    Root,
    /// A tenant site; carries the first label.
    Tenant(String),
    /// Neither, e.g. a single label or `www.a.b.c`.
    Unrecognized,
}

/// Classifies hostnames against a set of reserved first labels.
#[derive(Debug, Clone)]
pub struct Classifier {
    reserved: Vec<String>,
}

impl Classifier {
    pub fn new<I, S>(reserved: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { reserved: reserved.into_iter().map(Into::into).collect() }
    }

    /// Classifies `host`, which may carry a `:port` suffix. Hostnames are
    /// case-insensitive, so the tenant label is returned lowercased.
    ///
    /// - 2 labels, or 3 labels led by a reserved alias, or `localhost` → root
    /// - otherwise ≥ 3 labels not led by a reserved alias or `localhost` →
    ///   tenant named by the first label
    /// - anything else → unrecognized
    pub fn classify(&self, host: &str) -> HostKind {
        let host = host.split(':').next().unwrap_or_default().to_ascii_lowercase();
        let labels: Vec<&str> = host.split('.').collect();
        let first = labels[0];

        let reserved = self.is_reserved(first);
        if labels.len() == 2 || (labels.len() == 3 && reserved) || host == "localhost" {
            return HostKind::Root;
        }

        if labels.len() >= 3 && !reserved && first != "localhost" {
            return HostKind::Tenant(first.to_owned());
        }

        HostKind::Unrecognized
    }

    fn is_reserved(&self, label: &str) -> bool {
        self.reserved.iter().any(|r| r == label)
    }
}

impl Default for Classifier {
    /// Only `www` is reserved.
    fn default() -> Self {
        Self::new(["www"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tenant(label: &str) -> HostKind {
        HostKind::Tenant(label.into())
    }

    #[test]
    fn tenant_host() {
        let c = Classifier::default();
        assert_eq!(c.classify("acme.stonesystems.io"), tenant("acme"));
        assert_eq!(c.classify("acme-plumbing.stonesystems.dev:443"), tenant("acme-plumbing"));
    }

    #[test]
    fn host_case_is_ignored() {
        let c = Classifier::default();
        assert_eq!(c.classify("Acme.StoneSystems.io"), tenant("acme"));
        assert_eq!(c.classify("WWW.StoneSystems.IO"), HostKind::Root);
        assert_eq!(c.classify("LocalHost:3000"), HostKind::Root);
    }

    #[test]
    fn root_hosts() {
        let c = Classifier::default();
        assert_eq!(c.classify("stonesystems.io"), HostKind::Root);
        assert_eq!(c.classify("www.stonesystems.io"), HostKind::Root);
        assert_eq!(c.classify("localhost"), HostKind::Root);
        assert_eq!(c.classify("localhost:3000"), HostKind::Root);
    }

    #[test]
    fn unrecognized_hosts() {
        let c = Classifier::default();
        assert_eq!(c.classify("intranet"), HostKind::Unrecognized);
        assert_eq!(c.classify(""), HostKind::Unrecognized);
        assert_eq!(c.classify("www.eu.stonesystems.io"), HostKind::Unrecognized);
        assert_eq!(c.classify("localhost.localdomain.lan"), HostKind::Unrecognized);
    }

    #[test]
    fn extra_reserved_aliases() {
        let c = Classifier::new(["www", "dev"]);
        assert_eq!(c.classify("dev.stonesystems.io"), HostKind::Root);
        assert_eq!(Classifier::default().classify("dev.stonesystems.io"), tenant("dev"));
    }

    #[test]
    fn deeper_hosts_use_first_label() {
        let c = Classifier::default();
        assert_eq!(c.classify("acme.preview.stonesystems.io"), tenant("acme"));
    }
}
