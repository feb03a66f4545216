#[cfg(feature = "ssr")]
use baby_pool::{create_schema, establish_connection};

#[cfg(feature = "ssr")]
fn main() {
    let mut conn = establish_connection();
    create_schema(&mut conn).expect("Failed to create schema");
    println!("Database schema created.");
}

#[cfg(not(feature = "ssr"))]
fn main() {
    println!("This binary requires the 'ssr' feature to be enabled.");
}
