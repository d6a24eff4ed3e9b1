use crate::collection::Document;
use crate::common::{PluginRegistrar, PotashModule, PotashPlugin, PotashPluginProvider, Value};
use crate::errors::{ErrorKind, PotashError, PotashResult};
use crate::potash_config::PotashConfig;
use std::ops::Deref;
use std::sync::Arc;

/// Converts between the [Value] form of an application object and the
/// [Document] stored for it.
///
/// The mapper id is recorded on every repository collection; opening the
/// collection later with a mapper of a different id fails.
pub trait PotashMapperProvider: PotashPluginProvider {
    fn mapper_id(&self) -> String;

    fn to_document(&self, value: Value) -> PotashResult<Document>;

    fn to_value(&self, document: Document) -> PotashResult<Value>;
}

#[derive(Clone)]
pub struct PotashMapper {
    inner: Arc<dyn PotashMapperProvider>,
}

impl PotashMapper {
    pub fn new<T: PotashMapperProvider + 'static>(inner: T) -> Self {
        PotashMapper { inner: Arc::new(inner) }
    }
}

impl Deref for PotashMapper {
    type Target = Arc<dyn PotashMapperProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// The default mapper: an object's value must already be a document.
#[derive(Clone, Default)]
pub struct DocumentMapper;

impl DocumentMapper {
    pub fn new() -> Self {
        DocumentMapper
    }
}

impl PotashPluginProvider for DocumentMapper {
    fn initialize(&self, _config: PotashConfig) -> PotashResult<()> {
        Ok(())
    }

    fn close(&self) -> PotashResult<()> {
        Ok(())
    }

    fn as_plugin(&self) -> PotashPlugin {
        PotashPlugin::new(self.clone())
    }
}

impl PotashMapperProvider for DocumentMapper {
    fn mapper_id(&self) -> String {
        "potash.document-mapper".to_string()
    }

    fn to_document(&self, value: Value) -> PotashResult<Document> {
        match value {
            Value::Document(document) => Ok(document),
            other => {
                log::error!("Cannot map a {} to a document", other.type_name());
                Err(PotashError::new(
                    &format!("Cannot map a {} to a document", other.type_name()),
                    ErrorKind::MappingError,
                ))
            }
        }
    }

    fn to_value(&self, document: Document) -> PotashResult<Value> {
        Ok(Value::Document(document))
    }
}

/// Registers the [DocumentMapper] explicitly.
///
/// Needed for repositories when a spatial indexer is loaded, since the
/// default mapper is only filled in when neither plugin is present.
#[derive(Clone, Copy, Default)]
pub struct DocumentMapperModule;

impl PotashModule for DocumentMapperModule {
    fn load(&self, plugin_registrar: &PluginRegistrar) -> PotashResult<()> {
        plugin_registrar.register_mapper_plugin(PotashMapper::new(DocumentMapper::new()))
    }
}
