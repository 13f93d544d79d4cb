//! Huddle availability server - integration test support.
//!
//! Re-exports the workspace crates so integration tests can address the
//! whole stack through `huddle_test::` paths.

#![allow(ambiguous_glob_reexports)]

pub mod component {
    pub use huddle_core::*;
    pub use huddle_service::*;

    pub mod db {
        pub use huddle_db::db::*;

        pub mod connection {
            pub use huddle_app::db_handler::DbProviderHandler;
            pub use huddle_db::db::connection::*;
        }
    }

    pub mod model {
        pub use huddle_db::model::*;
    }

    pub mod config {
        pub use huddle_app::config::ConfigHandler;
        pub use huddle_core::config::*;
    }
}

pub mod app {
    pub use huddle_app::*;

    pub mod api {
        pub use huddle_app::app::api::*;
    }
}
