// document fields
pub const DOC_ID: &str = "_id";
pub const DOC_REVISION: &str = "_revision";
pub const DOC_MODIFIED: &str = "_modified";
pub const RESERVED_FIELDS: [&str; 3] = [DOC_ID, DOC_REVISION, DOC_MODIFIED];

// collection attributes
pub const CREATED_TIME: &str = "created_at";
pub const LAST_MODIFIED_TIME: &str = "last_modified_at";
pub const MAPPER_ID: &str = "mapper";
pub const ENTITY_TYPE: &str = "entity_type";

// store maps
pub const COLLECTION_CATALOG: &str = "$potash_catalog";
pub const META_MAP_NAME: &str = "$potash_meta";
pub const USER_MAP: &str = "$potash_users";
pub const INDEX_PREFIX: &str = "$index";
pub const INDEX_CATALOG_PREFIX: &str = "$indexes";
pub const TAG_COLLECTION: &str = "collection";
pub const TAG_REPOSITORY: &str = "repository";
pub const TAG_KEYED_REPOSITORY: &str = "keyed-repository";

// names
pub const INTERNAL_NAME_SEPARATOR: &str = "|";
pub const KEY_OBJ_SEPARATOR: &str = "+";
pub const DEFAULT_FIELD_SEPARATOR: &str = ".";
pub const RESERVED_NAME_CHARS: [&str; 2] = [INTERNAL_NAME_SEPARATOR, KEY_OBJ_SEPARATOR];

// index types
pub const UNIQUE_INDEX: &str = "unique";
pub const NON_UNIQUE_INDEX: &str = "non-unique";
pub const SPATIAL_INDEX: &str = "spatial";
pub const FULL_TEXT_INDEX: &str = "full-text";

// events
pub const POTASH_EVENT: &str = "potash_event";

pub const POTASH_VERSION: &str = env!("CARGO_PKG_VERSION");
