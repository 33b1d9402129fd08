//! CRI-O drop-in configuration

use nodeboot_imds::ContainerRuntime;
use serde::Serialize;

/// Top level of a CRI-O `.conf` file
#[derive(Debug, Default, Serialize)]
pub struct CrioConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crio: Option<Crio>,
}

/// The `[crio]` table
#[derive(Debug, Default, Serialize)]
pub struct Crio {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<CrioImage>,
}

/// The `[crio.image]` table
#[derive(Debug, Default, Serialize)]
pub struct CrioImage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_volumes: Option<String>,
}

impl CrioConfig {
    /// Settings the operator declared; empty values are left out
    pub fn from_runtime(runtime: &ContainerRuntime) -> Self {
        let image_volumes = non_empty(&runtime.image_volumes);
        Self {
            crio: image_volumes.map(|image_volumes| Crio {
                image: Some(CrioImage {
                    image_volumes: Some(image_volumes),
                }),
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.crio.is_none()
    }
}

/// Render the CRI-O settings the operator declared, if any
pub fn render(runtime: &ContainerRuntime) -> Result<Option<String>, toml::ser::Error> {
    let config = CrioConfig::from_runtime(runtime);
    if config.is_empty() {
        return Ok(None);
    }
    toml::to_string(&config).map(Some)
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_volumes(rendered: &str) -> Option<String> {
        let parsed: toml::Value = toml::from_str(rendered).unwrap();
        parsed
            .get("crio")?
            .get("image")?
            .get("image_volumes")?
            .as_str()
            .map(str::to_string)
    }

    #[test]
    fn test_nothing_declared() {
        assert_eq!(render(&ContainerRuntime::default()).unwrap(), None);
    }

    #[test]
    fn test_image_volumes() {
        let runtime = ContainerRuntime {
            image_volumes: "bind".to_string(),
        };
        let rendered = render(&runtime).unwrap().unwrap();
        assert!(rendered.contains("[crio.image]"));
        assert!(rendered.contains("image_volumes = \"bind\""));
        assert_eq!(image_volumes(&rendered).as_deref(), Some("bind"));
    }

    #[test]
    fn test_awkward_values_stay_valid_toml() {
        for value in ["bind\nignore", r#"a"b\c"#, "tab\there"] {
            let runtime = ContainerRuntime {
                image_volumes: value.to_string(),
            };
            let rendered = render(&runtime).unwrap().unwrap();
            assert_eq!(image_volumes(&rendered).as_deref(), Some(value));
        }
    }
}
