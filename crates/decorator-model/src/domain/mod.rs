mod kv;
pub use kv::KeyValueTag;

mod labels;
pub use labels::Labels;

mod prefix;
pub use prefix::LabelPrefix;

mod name;
pub use name::{MAX_LABEL_NAME_LEN, is_valid_label_name};

mod constants;
pub use constants::{
    IDENTITY_HOST, IDENTITY_INSTANCE_ID, IDENTITY_INSTANCE_TYPE, IDENTITY_LABEL, IDENTITY_REGION,
    TAG_SEPARATORS,
};
