mod domain;
pub use domain::{
    IDENTITY_HOST, IDENTITY_INSTANCE_ID, IDENTITY_INSTANCE_TYPE, IDENTITY_LABEL, IDENTITY_REGION,
    TAG_SEPARATORS,
};
pub use domain::{KeyValueTag, LabelPrefix, Labels, MAX_LABEL_NAME_LEN, is_valid_label_name};

mod error;
pub use error::ModelError;

mod instance;
pub use instance::InstanceData;
