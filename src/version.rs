use serde::Deserialize;

/// Build information of the API server, as served at `/version`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    /// Major version of the ApiServer
    pub major: String,

    /// Minor version of the ApiServer
    pub minor: String,

    #[serde(default)]
    pub git_version: String,

    #[serde(default)]
    pub platform: String,
}

impl Version {
    /// Parses `major` and `minor` into numbers. Managed offerings often add
    /// a suffix like `28+`, which is ignored.
    pub fn semantic(&self) -> Option<(u32, u32)> {
        fn leading_number(value: &str) -> Option<u32> {
            let end = value
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(value.len());
            value[..end].parse().ok()
        }

        Some((leading_number(&self.major)?, leading_number(&self.minor)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize() {
        let version = serde_json::from_str::<Version>(
            r#"{
  "major": "1",
  "minor": "28+",
  "gitVersion": "v1.28.3-eks-4f4795d",
  "gitCommit": "2a5d2fc5e7e5db2ae8cd3e2bd8e20e6f3d0b3d4e",
  "platform": "linux/amd64"
}"#,
        )
        .unwrap();

        assert_eq!(version.git_version, "v1.28.3-eks-4f4795d");
        assert_eq!(version.platform, "linux/amd64");
        assert_eq!(version.semantic(), Some((1, 28)));
    }

    #[test]
    fn not_a_number() {
        let version = Version {
            major: "".into(),
            minor: "1".into(),
            git_version: String::new(),
            platform: String::new(),
        };

        assert_eq!(version.semantic(), None);
    }
}
