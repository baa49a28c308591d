/*!
    Utilities for working with installation, script, and module paths.
*/

mod std;

pub mod constants;

pub use self::std::{append_extension, clean_path, get_current_exe, make_absolute};
