//! Password hashing for config files.

use console::style;

use crate::auth::hash_password;

pub fn cmd_hash_password(password: &str) {
    let hash = hash_password(password);
    println!("{}", hash);
    eprintln!(
        "{} Add to config under [[auth.users]] as password_hash = \"{}\"",
        style("→").cyan(),
        hash
    );
}
