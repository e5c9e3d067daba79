pub mod environment;
pub mod paths;
pub mod text;

pub use environment::get_home_dir;
pub use paths::{
    DATA_DIR_NAME, create_data_dir, data_dir, ensure_initialized, format_path_with_tilde,
    project_name, read_capped_file, resolve_output_path, validate_file_size,
};
pub use text::{ELLIPSIS, char_len, first_line, truncate};
