//! Startup banner and farewell display.

use crate::consts::{AUTHOR, VERSION};

/// Session configuration for display in the startup banner.
pub struct BannerInfo<'a> {
    pub database: &'a str,
    pub catalog: &'a str,
    pub prefix: char,
    pub bot_name: &'a str,
    pub clear_policy: &'a str,
    pub user: &'a str,
}

/// Print the startup banner with session info.
pub fn print_banner(info: &BannerInfo) {
    println!(
        r#"
   ╔═══════════════════════════════════════╗
   ║          V O T E   N I G H T          ║
   ║      one person, one movie, one vote  ║
   ╚═══════════════════════════════════════╝

   version   {}
   by        {}
   database  {}
   catalog   {}
   commands  {}help  or  @{} help
   clear     {}
   you are   {}  (switch with "@name: ...")
"#,
        VERSION,
        AUTHOR,
        info.database,
        info.catalog,
        info.prefix,
        info.bot_name,
        info.clear_policy,
        info.user,
    );
}

pub fn print_goodbye() {
    println!("enjoy the movie.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_banner_does_not_panic() {
        let info = BannerInfo {
            database: "ephemeral",
            catalog: "omdb",
            prefix: '/',
            bot_name: "votenight",
            clear_policy: "all",
            user: "me",
        };
        print_banner(&info);
    }

    #[test]
    fn print_goodbye_does_not_panic() {
        print_goodbye();
    }
}
