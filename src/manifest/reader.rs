// src/manifest/reader.rs

//! Manifest parsing
//!
//! Reads manifest text into a [`ManifestInfo`]:
//!
//! 1. stream the document, filling identity, parent, properties and every
//!    dependency category in document order;
//! 2. inherit the group and version from the parent when absent;
//! 3. expand `${...}` placeholders in every field using the manifest identity
//!    and its property table;
//! 4. apply per-category defaults (plugin group and type, dependency type).

use super::{
    Dependency, DependencyKind, ElementPath, ManifestError, ManifestInfo, DEFAULT_PLUGIN_GROUP,
    DEFAULT_TYPE, PLUGIN_TYPE,
};
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::Reader;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Placeholder expansion stops after this many nested substitutions
const MAX_EXPANSION_DEPTH: usize = 16;

pub(crate) const PROJECT_FIELDS: &[&str] = &["groupId", "artifactId", "version", "packaging"];
pub(crate) const PARENT_FIELDS: &[&str] = &["groupId", "artifactId", "version", "relativePath"];
pub(crate) const ENTRY_FIELDS: &[&str] =
    &["groupId", "artifactId", "version", "type", "classifier", "scope", "optional"];

/// Parser turning manifest text into a [`ManifestInfo`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestReader;

impl ManifestReader {
    pub fn new() -> Self {
        Self
    }

    /// Read and parse a manifest file
    pub fn read_file(&self, path: &Path) -> Result<ManifestInfo, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.read_str(&content)
    }

    /// Parse manifest text
    pub fn read_str(&self, content: &str) -> Result<ManifestInfo, ManifestError> {
        let raw = parse_document(content)?;
        if raw.project.artifact_id.is_none() {
            return Err(ManifestError::MissingArtifact);
        }
        Ok(raw.finish())
    }
}

/// Local element name as an owned string
pub(crate) fn local_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

/// Read the text of a simple element up to its end tag, unescaped and trimmed
pub(crate) fn read_element_text(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart<'_>,
) -> Result<(String, String), ManifestError> {
    let qname = start.name().as_ref().to_vec();
    let raw = reader
        .read_text(QName(&qname))
        .map_err(|source| ManifestError::xml(reader, source))?
        .into_owned();
    let text = unescape(&raw)?.trim().to_string();
    Ok((raw, text))
}

/// Which identity a field element belongs to
enum Target {
    Project,
    Parent,
    Entry,
}

#[derive(Default)]
struct RawManifest {
    project: Dependency,
    parent: Option<Dependency>,
    packaging: Option<String>,
    properties: HashMap<String, String>,
    has_properties: bool,
    entries: Vec<(DependencyKind, Dependency)>,
}

fn parse_document(content: &str) -> Result<RawManifest, ManifestError> {
    let mut reader = Reader::from_str(content);
    let mut path = ElementPath::new();
    let mut raw = RawManifest {
        project: Dependency {
            dep_type: String::new(),
            ..Dependency::default()
        },
        ..RawManifest::default()
    };
    let mut open: Vec<(DependencyKind, Dependency)> = Vec::new();
    let mut saw_root = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|source| ManifestError::xml(&reader, source))?;
        match event {
            Event::Start(start) => {
                let name = local_name(&start);
                if path.depth() == 0 {
                    if name != "project" {
                        return Err(ManifestError::MissingRoot);
                    }
                    saw_root = true;
                }

                if let Some(target) = field_target(&path, &open, &name) {
                    let (_, text) = read_element_text(&mut reader, &start)?;
                    assign_field(&mut raw, &mut open, target, &name, text);
                    continue;
                }
                if path.is(&["project", "properties"]) {
                    let (_, text) = read_element_text(&mut reader, &start)?;
                    raw.properties.insert(name, text);
                    continue;
                }
                if path.is(&["project"]) && name == "properties" {
                    raw.has_properties = true;
                }

                match path.push(&name) {
                    Some(DependencyKind::Modules) => {
                        path.pop();
                        let (_, text) = read_element_text(&mut reader, &start)?;
                        raw.entries.push((DependencyKind::Modules, module_entry(text)));
                    }
                    Some(kind) => open.push((kind, entry_template(kind))),
                    None => {}
                }
            }
            Event::Empty(start) => {
                let name = local_name(&start);
                if path.depth() == 0 {
                    return Err(ManifestError::MissingRoot);
                }
                if let Some(target) = field_target(&path, &open, &name) {
                    assign_field(&mut raw, &mut open, target, &name, String::new());
                } else if path.is(&["project", "properties"]) {
                    raw.properties.insert(name, String::new());
                } else if path.is(&["project"]) && name == "properties" {
                    raw.has_properties = true;
                } else {
                    match path.push(&name) {
                        Some(DependencyKind::Modules) | None => {}
                        Some(kind) => raw.entries.push((kind, entry_template(kind))),
                    }
                    path.pop();
                }
            }
            Event::End(_) => {
                if let Some(frame) = path.pop()
                    && frame.entry.is_some()
                    && let Some(entry) = open.pop()
                {
                    raw.entries.push(entry);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(ManifestError::MissingRoot);
    }
    Ok(raw)
}

/// Decide whether an element `name` opened at `path` is an identity field
fn field_target(
    path: &ElementPath,
    open: &[(DependencyKind, Dependency)],
    name: &str,
) -> Option<Target> {
    if path.is(&["project"]) && PROJECT_FIELDS.contains(&name) {
        Some(Target::Project)
    } else if path.is(&["project", "parent"]) && PARENT_FIELDS.contains(&name) {
        Some(Target::Parent)
    } else if path.current_entry().is_some() && !open.is_empty() && ENTRY_FIELDS.contains(&name) {
        Some(Target::Entry)
    } else {
        None
    }
}

fn assign_field(
    raw: &mut RawManifest,
    open: &mut [(DependencyKind, Dependency)],
    target: Target,
    name: &str,
    text: String,
) {
    let dep = match target {
        Target::Project => {
            if name == "packaging" {
                raw.packaging = Some(text);
                return;
            }
            &mut raw.project
        }
        Target::Parent => raw.parent.get_or_insert_with(|| Dependency {
            dep_type: "pom".to_string(),
            ..Dependency::default()
        }),
        Target::Entry => match open.last_mut() {
            Some((_, dep)) => dep,
            None => return,
        },
    };

    match name {
        "groupId" => dep.group_id = Some(text),
        "artifactId" => dep.artifact_id = Some(text),
        "version" => dep.version = Some(text),
        "type" => dep.dep_type = text,
        "classifier" => dep.classifier = Some(text),
        "scope" => dep.scope = Some(text),
        "optional" => dep.optional = text == "true",
        "relativePath" => dep.relative_path = Some(text),
        _ => {}
    }
}

fn entry_template(kind: DependencyKind) -> Dependency {
    let dep_type = if kind.is_plugin() { PLUGIN_TYPE } else { DEFAULT_TYPE };
    Dependency {
        dep_type: dep_type.to_string(),
        ..Dependency::default()
    }
}

fn module_entry(path: String) -> Dependency {
    Dependency {
        artifact_id: Some(path.clone()),
        dep_type: "pom".to_string(),
        relative_path: Some(path),
        ..Dependency::default()
    }
}

impl RawManifest {
    fn finish(self) -> ManifestInfo {
        let RawManifest {
            mut project,
            mut parent,
            packaging,
            properties,
            has_properties,
            entries,
        } = self;

        let explicit_version = project.version.is_some();
        if let Some(ref parent) = parent {
            if project.group_id.is_none() {
                project.group_id = parent.group_id.clone();
            }
            if project.version.is_none() {
                project.version = parent.version.clone();
            }
        }
        project.dep_type = packaging.unwrap_or_else(|| DEFAULT_TYPE.to_string());

        let expander = Expander::new(&project, parent.as_ref(), &properties);
        expander.expand_dependency(&mut project);
        if let Some(ref mut parent) = parent {
            expander.expand_dependency(parent);
        }
        let properties = expander.expanded_properties();

        let mut info = ManifestInfo::new(project);
        info.parent = parent;
        info.properties = properties;
        info.explicit_version = explicit_version;
        info.has_properties = has_properties;

        for (kind, mut dep) in entries {
            if kind != DependencyKind::Modules {
                expander.expand_dependency(&mut dep);
            }
            if kind.is_plugin() && dep.group_id.is_none() {
                dep.group_id = Some(DEFAULT_PLUGIN_GROUP.to_string());
            }
            if dep.dep_type.is_empty() {
                dep.dep_type = DEFAULT_TYPE.to_string();
            }
            info.push(kind, dep);
        }
        info
    }
}

/// Placeholder expansion over the manifest identity and property table
struct Expander {
    values: HashMap<String, String>,
    properties: HashMap<String, String>,
}

impl Expander {
    fn new(
        project: &Dependency,
        parent: Option<&Dependency>,
        properties: &HashMap<String, String>,
    ) -> Self {
        let mut values = properties.clone();
        let mut builtin = |names: &[&str], value: Option<&String>| {
            if let Some(value) = value {
                for name in names {
                    values.insert(name.to_string(), value.clone());
                }
            }
        };
        builtin(&["project.groupId", "pom.groupId", "groupId"], project.group_id.as_ref());
        builtin(
            &["project.artifactId", "pom.artifactId", "artifactId"],
            project.artifact_id.as_ref(),
        );
        builtin(&["project.version", "pom.version", "version"], project.version.as_ref());
        if let Some(parent) = parent {
            builtin(
                &["project.parent.groupId", "parent.groupId"],
                parent.group_id.as_ref(),
            );
            builtin(
                &["project.parent.artifactId", "parent.artifactId"],
                parent.artifact_id.as_ref(),
            );
            builtin(
                &["project.parent.version", "parent.version"],
                parent.version.as_ref(),
            );
        }

        Self {
            values,
            properties: properties.clone(),
        }
    }

    fn expanded_properties(&self) -> HashMap<String, String> {
        self.properties
            .iter()
            .map(|(key, value)| (key.clone(), self.expand(value)))
            .collect()
    }

    fn expand_dependency(&self, dep: &mut Dependency) {
        for field in [
            &mut dep.group_id,
            &mut dep.artifact_id,
            &mut dep.version,
            &mut dep.classifier,
            &mut dep.scope,
        ] {
            if let Some(value) = field.as_mut() {
                *value = self.expand(value);
            }
        }
        dep.dep_type = self.expand(&dep.dep_type);
    }

    /// Expand placeholders until none that can be resolved remain
    fn expand(&self, value: &str) -> String {
        let mut current = value.to_string();
        for _ in 0..MAX_EXPANSION_DEPTH {
            if !current.contains("${") {
                return current;
            }
            let next = self.expand_once(&current);
            if next == current {
                debug!("Unresolved placeholder in '{}'", current);
                return current;
            }
            current = next;
        }
        debug!("Placeholder expansion did not settle for '{}'", value);
        current
    }

    fn expand_once(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len());
        let mut rest = value;
        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) => {
                    let key = &after[..end];
                    match self.values.get(key) {
                        Some(replacement) => out.push_str(replacement),
                        None => {
                            out.push_str("${");
                            out.push_str(key);
                            out.push('}');
                        }
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}
