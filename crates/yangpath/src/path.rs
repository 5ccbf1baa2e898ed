//! Resource paths and their segments.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::encode::{decode_key, encode_key};
use crate::error::{Error, Result};

/// One step of a resource path.
///
/// A segment is a node name, optionally qualified with the YANG module that
/// defines it (`openconfig-qos:qos`), and optionally carrying the key values
/// of a list entry (`interface=Eth1%2f5`, `protocol=BGP,bgp`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    module: Option<String>,
    name: String,
    keys: Vec<String>,
}

impl Segment {
    /// A container or leaf segment. `name` may be module-qualified.
    pub fn node(name: &str) -> Self {
        let (module, name) = split_module(name);
        Self {
            module,
            name,
            keys: Vec::new(),
        }
    }

    /// A list-entry segment with its key values (unencoded).
    pub fn entry<I, K>(name: &str, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let mut segment = Self::node(name);
        segment.keys = keys.into_iter().map(Into::into).collect();
        segment
    }

    /// Module prefix, if the segment is qualified.
    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    /// Node name without module prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Decoded key values; empty for non-list segments.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Whether this segment addresses a list entry.
    pub fn is_entry(&self) -> bool {
        !self.keys.is_empty()
    }

    /// The segment without its key predicate.
    pub fn without_keys(&self) -> Self {
        Self {
            module: self.module.clone(),
            name: self.name.clone(),
            keys: Vec::new(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::segment(self.to_string(), "empty node name"));
        }
        if self.module.as_deref() == Some("") {
            return Err(Error::segment(self.to_string(), "empty module prefix"));
        }
        let text = format!("{}{}", self.module.as_deref().unwrap_or(""), self.name);
        if text.contains(['/', '=', ',', '%']) {
            return Err(Error::segment(
                self.to_string(),
                "reserved character in node name",
            ));
        }
        if self.keys.iter().any(String::is_empty) {
            return Err(Error::segment(self.to_string(), "empty key value"));
        }
        Ok(())
    }

    fn parse(text: &str) -> Result<Self> {
        if text.is_empty() {
            return Err(Error::segment(text, "empty segment"));
        }

        let (head, keys) = match text.split_once('=') {
            Some((head, predicate)) => {
                let keys = predicate
                    .split(',')
                    .map(decode_key)
                    .collect::<Result<Vec<_>>>()?;
                (head, keys)
            }
            None => (text, Vec::new()),
        };

        let segment = Self::entry(head, keys);
        segment.validate()?;
        Ok(segment)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(module) = &self.module {
            write!(f, "{module}:")?;
        }
        write!(f, "{}", self.name)?;
        if !self.keys.is_empty() {
            let encoded: Vec<String> = self.keys.iter().map(|k| encode_key(k)).collect();
            write!(f, "={}", encoded.join(","))?;
        }
        Ok(())
    }
}

fn split_module(name: &str) -> (Option<String>, String) {
    match name.split_once(':') {
        Some((module, local)) => (Some(module.to_string()), local.to_string()),
        None => (None, name.to_string()),
    }
}

/// A hierarchical resource address.
///
/// Paths are immutable values: [`Path::join`] and [`Path::child`] return new
/// paths and leave the receiver untouched. The textual form is the one used in
/// RESTCONF URLs (without the `/restconf/` prefix), and
/// `Path::parse(&path.to_string()) == Ok(path)` holds for every valid path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// The empty path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from segments, validating each one.
    pub fn build<I>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = Segment>,
    {
        let segments: Vec<Segment> = segments.into_iter().collect();
        for segment in &segments {
            segment.validate()?;
        }
        Ok(Self { segments })
    }

    /// Parse the textual form. Leading and trailing `/` are ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        let segments = trimmed
            .split('/')
            .map(Segment::parse)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { segments })
    }

    /// Append another path.
    pub fn join(&self, other: &Path) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    /// Append a single segment after validating it.
    pub fn child(&self, segment: Segment) -> Result<Self> {
        segment.validate()?;
        let mut segments = self.segments.clone();
        segments.push(segment);
        Ok(Self { segments })
    }

    /// The segments of this path.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Last segment, if any.
    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// Path without its last segment.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether `prefix` addresses this path or one of its ancestors.
    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Node names with module prefixes and key predicates removed.
    pub fn stripped(&self) -> Vec<&str> {
        self.segments.iter().map(Segment::name).collect()
    }

    /// Module that governs the terminal segment: the nearest prefix found
    /// walking from the end of the path towards the root.
    pub fn effective_module(&self) -> Option<&str> {
        self.segments.iter().rev().find_map(Segment::module)
    }

    /// Terminal node name qualified with its effective module.
    ///
    /// This is the key a RESTCONF body must use when targeting this path,
    /// e.g. `openconfig-system-ext:ciphers` for
    /// `.../openconfig-system-ext:ssh-client/config/ciphers`.
    pub fn qualified_leaf(&self) -> Option<String> {
        let last = self.last()?;
        Some(match self.effective_module() {
            Some(module) => format!("{module}:{}", last.name()),
            None => last.name().to_string(),
        })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SSH_CLIENT: &str = "data/openconfig-system:system/openconfig-system-ext:ssh-client/config";

    #[test]
    fn test_parse_module_qualified_path() {
        let path = Path::parse(SSH_CLIENT).unwrap();
        assert_eq!(path.len(), 4);
        assert_eq!(path.segments()[1].module(), Some("openconfig-system"));
        assert_eq!(path.segments()[2].name(), "ssh-client");
        assert_eq!(path.stripped(), vec!["data", "system", "ssh-client", "config"]);
        assert_eq!(path.to_string(), SSH_CLIENT);
    }

    #[test]
    fn test_parse_list_predicates() {
        let path = Path::parse(
            "data/openconfig-network-instance:network-instances/network-instance=default/protocols/protocol=BGP,bgp",
        )
        .unwrap();
        let last = path.last().unwrap();
        assert_eq!(last.name(), "protocol");
        assert_eq!(last.keys(), ["BGP", "bgp"]);
        assert!(last.is_entry());
    }

    #[test]
    fn test_build_encodes_keys() {
        let path = Path::build([
            Segment::node("data"),
            Segment::node("openconfig-qos:qos"),
            Segment::node("queues"),
            Segment::entry("queue", ["Eth1/5:0"]),
            Segment::node("wred"),
        ])
        .unwrap();
        assert_eq!(
            path.to_string(),
            "data/openconfig-qos:qos/queues/queue=Eth1%2f5:0/wred"
        );
    }

    #[test]
    fn test_build_rejects_empty_key() {
        let err = Path::build([Segment::node("interfaces"), Segment::entry("interface", [""])])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSegment { .. }));
    }

    #[test]
    fn test_build_rejects_reserved_name() {
        assert!(Path::build([Segment::node("a/b")]).is_err());
        assert!(Path::build([Segment::node("")]).is_err());
        assert!(Path::build([Segment::node(":qos")]).is_err());
    }

    #[test]
    fn test_parse_rejects_empty_segment() {
        assert!(Path::parse("data//qos").is_err());
        assert!(Path::parse("data/interface=").is_err());
    }

    #[test]
    fn test_round_trip_with_reserved_characters() {
        let original = Path::build([
            Segment::node("openconfig-interfaces:interfaces"),
            Segment::entry("interface", ["Eth1/5"]),
            Segment::entry("subinterface", ["a,b=c%d"]),
            Segment::node("config"),
        ])
        .unwrap();
        let reparsed = Path::parse(&original.to_string()).unwrap();
        assert_eq!(reparsed, original);
        assert_eq!(reparsed.segments()[1].keys(), ["Eth1/5"]);
    }

    #[test]
    fn test_join_is_pure() {
        let base = Path::parse("data/openconfig-qos:qos").unwrap();
        let child = Path::parse("interfaces").unwrap();
        let joined = base.join(&child);
        assert_eq!(base.to_string(), "data/openconfig-qos:qos");
        assert_eq!(joined.to_string(), "data/openconfig-qos:qos/interfaces");
        assert!(joined.starts_with(&base));
        assert!(!base.starts_with(&joined));
    }

    #[test]
    fn test_child_validates() {
        let base = Path::parse("qos/queues").unwrap();
        assert!(base.child(Segment::entry("queue", [""])).is_err());
        let entry = base.child(Segment::entry("queue", ["Eth1/5:1"])).unwrap();
        assert_eq!(entry.to_string(), "qos/queues/queue=Eth1%2f5:1");
        assert_eq!(entry.parent().unwrap(), base);
    }

    #[test]
    fn test_qualified_leaf() {
        let path = Path::parse(SSH_CLIENT).unwrap().join(&Path::parse("ciphers").unwrap());
        assert_eq!(
            path.qualified_leaf().as_deref(),
            Some("openconfig-system-ext:ciphers")
        );
        assert_eq!(Path::parse("config/enable").unwrap().qualified_leaf().as_deref(), Some("enable"));
        assert_eq!(Path::root().qualified_leaf(), None);
    }

    #[test]
    fn test_serde_as_string() {
        let path = Path::parse("data/openconfig-qos:qos/interfaces/interface=Eth1%2f5").unwrap();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"data/openconfig-qos:qos/interfaces/interface=Eth1%2f5\"");
        let back: Path = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }
}
