use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use autodim_core::document::{Document, Entity};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write file {path:?}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse plan: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("failed to serialize plan: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("invalid document structure: {0}")]
    InvalidDocument(String),
}

pub trait DocumentLoader {
    fn load(&self, path: &Path) -> Result<Document, IoError>;
}

pub trait DocumentSaver {
    fn save(&self, document: &Document, path: &Path) -> Result<(), IoError>;
}

/// JSON 平面图文件的读写入口。
#[derive(Debug, Default, Clone, Copy)]
pub struct PlanFacade;

impl PlanFacade {
    pub fn new() -> Self {
        Self
    }

    /// 解析 JSON 文本并校验文档结构。
    pub fn parse_str(&self, data: &str) -> Result<Document, IoError> {
        let document: Document = serde_json::from_str(data).map_err(IoError::Parse)?;
        validate(&document)?;
        Ok(document)
    }

    pub fn to_json(&self, document: &Document) -> Result<String, IoError> {
        serde_json::to_string_pretty(document).map_err(IoError::Serialize)
    }
}

impl DocumentLoader for PlanFacade {
    fn load(&self, path: &Path) -> Result<Document, IoError> {
        let data = fs::read_to_string(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_str(&data)
    }
}

impl DocumentSaver for PlanFacade {
    fn save(&self, document: &Document, path: &Path) -> Result<(), IoError> {
        let data = self.to_json(document)?;
        fs::write(path, data).map_err(|source| IoError::WriteError {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// 检查反序列化后的文档是否自洽。
pub fn validate(document: &Document) -> Result<(), IoError> {
    if document.view(document.active_view()).is_none() {
        return Err(IoError::InvalidDocument(format!(
            "active view {} does not exist",
            document.active_view().get()
        )));
    }

    let mut seen = HashSet::new();
    for (id, entity) in document.entities() {
        if !seen.insert(*id) {
            return Err(IoError::InvalidDocument(format!(
                "duplicate entity id {}",
                id.get()
            )));
        }
        if id.get() >= document.next_entity_id() {
            return Err(IoError::InvalidDocument(format!(
                "entity id {} is not below next_entity_id {}",
                id.get(),
                document.next_entity_id()
            )));
        }
        if document.layer(entity.layer_name()).is_none() {
            return Err(IoError::InvalidDocument(format!(
                "entity {} uses unknown layer {:?}",
                id.get(),
                entity.layer_name()
            )));
        }
        if let Entity::Dimension(dimension) = entity {
            if document.dimension_type(dimension.dimension_type).is_none() {
                return Err(IoError::InvalidDocument(format!(
                    "dimension {} uses unknown dimension type #{}",
                    id.get(),
                    dimension.dimension_type.index()
                )));
            }
            if document.view(dimension.view).is_none() {
                return Err(IoError::InvalidDocument(format!(
                    "dimension {} uses unknown view {}",
                    id.get(),
                    dimension.view.get()
                )));
            }
        }
    }
    Ok(())
}
