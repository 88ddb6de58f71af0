use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use templating::{
    CompilerConfig, ComponentTemplate, DirectiveDescriptor, DirectiveKind, DirectiveRegistry,
};

/// Directive registration file:
/// `{ "compiler": {...}, "directives": [{ "name", "selector", "kind", ... }] }`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectivesFile {
    #[serde(default)]
    pub compiler: CompilerConfig,
    #[serde(default)]
    pub directives: Vec<DirectiveEntry>,
    /// Directory `templateUrl` entries are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectiveEntry {
    pub name: String,
    pub selector: String,
    pub kind: EntryKind,
    pub template: Option<String>,
    pub template_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Decorator,
    Template,
    Component,
}

impl DirectivesFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read directives file {}", path.display()))?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::parse(&content, base_dir)
            .with_context(|| format!("invalid directives file {}", path.display()))
    }

    pub fn parse(content: &str, base_dir: PathBuf) -> anyhow::Result<Self> {
        let mut file: DirectivesFile = serde_json::from_str(content)?;
        file.base_dir = base_dir;
        Ok(file)
    }

    /// Registers every entry in file order. Component templates given by
    /// `templateUrl` are read here.
    pub fn into_registry(self) -> anyhow::Result<(DirectiveRegistry, CompilerConfig)> {
        self.compiler.validate()?;
        let mut registry = DirectiveRegistry::new();
        for entry in self.directives {
            let kind = match entry.kind {
                EntryKind::Decorator | EntryKind::Template => {
                    if entry.template.is_some() || entry.template_url.is_some() {
                        bail!("directive {} is not a component and cannot have a template", entry.name);
                    }
                    if entry.kind == EntryKind::Decorator {
                        DirectiveKind::Decorator
                    } else {
                        DirectiveKind::Template
                    }
                }
                EntryKind::Component => {
                    let source = match (entry.template, entry.template_url) {
                        (Some(template), None) => template,
                        (None, Some(url)) => {
                            let path = self.base_dir.join(&url);
                            fs::read_to_string(&path).with_context(|| {
                                format!("failed to read template of {} from {}", entry.name, path.display())
                            })?
                        }
                        _ => bail!(
                            "component {} needs exactly one of template and templateUrl",
                            entry.name
                        ),
                    };
                    DirectiveKind::Component(ComponentTemplate::Inline(source))
                }
            };
            let name = entry.name.clone();
            registry
                .register(DirectiveDescriptor::new(entry.name, entry.selector, kind))
                .with_context(|| format!("failed to register directive {}", name))?;
        }
        log::debug!("registered {} directive(s)", registry.len());
        Ok((registry, self.compiler))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ngt-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_parse_directives_and_compiler_options() {
        let file = DirectivesFile::parse(
            r#"{
                "compiler": { "interpolation": ["[[", "]]"], "anchorText": "hole" },
                "directives": [
                    { "name": "Name", "selector": "[name]", "kind": "decorator" },
                    { "name": "If", "selector": "[if]", "kind": "template" },
                    { "name": "Card", "selector": "card", "kind": "component", "template": "<b>{{x}}</b>" }
                ]
            }"#,
            PathBuf::new(),
        )
        .unwrap();
        let (registry, config) = file.into_registry().unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(config.interpolation.start, "[[");
        assert_eq!(config.anchor_text, "hole");
        assert_eq!(config.template_tag, "template");
        assert!(matches!(
            registry.get(2).unwrap().kind,
            DirectiveKind::Component(ComponentTemplate::Inline(ref source)) if source == "<b>{{x}}</b>"
        ));
    }

    #[test]
    fn test_template_url_is_relative_to_the_file() {
        let dir = temp_dir("url");
        fs::write(dir.join("card.html"), "<i>card</i>").unwrap();
        let path = dir.join("directives.json");
        fs::write(
            &path,
            r#"{ "directives": [{ "name": "Card", "selector": "card", "kind": "component", "templateUrl": "card.html" }] }"#,
        )
        .unwrap();

        let (registry, _) = DirectivesFile::load(&path).unwrap().into_registry().unwrap();
        assert!(matches!(
            registry.get(0).unwrap().kind,
            DirectiveKind::Component(ComponentTemplate::Inline(ref source)) if source == "<i>card</i>"
        ));
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_rejects_inconsistent_entries() {
        for content in [
            r#"{ "directives": [{ "name": "C", "selector": "c", "kind": "component" }] }"#,
            r#"{ "directives": [{ "name": "D", "selector": "[d]", "kind": "decorator", "template": "x" }] }"#,
            r#"{ "directives": [{ "name": "B", "selector": "a b", "kind": "decorator" }] }"#,
            r#"{ "compiler": { "templateTag": "" } }"#,
        ] {
            let file = DirectivesFile::parse(content, PathBuf::new()).unwrap();
            assert!(file.into_registry().is_err(), "{} should be rejected", content);
        }
        assert!(DirectivesFile::parse(r#"{ "directives": [{ "kind": "other" }] }"#, PathBuf::new()).is_err());
    }
}
