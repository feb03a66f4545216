#[cfg(feature = "ssr")]
use baby_pool::{clear_all_guesses, establish_connection};

#[cfg(feature = "ssr")]
fn main() {
    let mut conn = establish_connection();
    clear_all_guesses(&mut conn).expect("Failed to clear guesses");
    println!("All guesses and guest sessions cleared.");
}

#[cfg(not(feature = "ssr"))]
fn main() {
    println!("This binary requires the 'ssr' feature to be enabled.");
}
