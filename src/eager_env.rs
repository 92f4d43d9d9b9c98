use std::env;
use std::sync::LazyLock;

macro_rules! define_env_vars {
    ($(($name:ident, $env_name:expr, $type:ty)),* $(,)?) => {
        $(
            pub static $name: LazyLock<$type> = LazyLock::new(|| {
                let val = env::var($env_name).unwrap_or_else(|_| {
                    panic!("Missing required environment variable: {}", $env_name)
                });
                val.parse::<$type>().unwrap_or_else(|_| {
                    panic!(
                        "Failed to parse environment variable {} with value '{}' as {}",
                        $env_name,
                        val,
                        stringify!($type)
                    )
                })
            });
        )*

        /// Force initialization of all environment variables at startup
        /// Call this early in main() to fail fast if any env vars are missing
        pub fn check_env() {
            $(
                let _ = *$name;
            )*
            check_optional_env();
        }
    };
}

macro_rules! define_optional_env_vars {
    ($(($name:ident, $env_name:expr, $type:ty)),* $(,)?) => {
        $(
            pub static $name: LazyLock<Option<$type>> = LazyLock::new(|| {
                let val = env::var($env_name).ok()?;
                let parsed = val.parse::<$type>().unwrap_or_else(|_| {
                    panic!(
                        "Failed to parse environment variable {} with value '{}' as {}",
                        $env_name,
                        val,
                        stringify!($type)
                    )
                });
                Some(parsed)
            });
        )*

        fn check_optional_env() {
            $(
                let _ = *$name;
            )*
        }
    };
}

define_env_vars!(
    (PORT, "PORT", u16),
    (FINGER_TABLE_SIZE, "FINGER_TABLE_SIZE", u32),
);

define_optional_env_vars!(
    (ADVERTISED_HOST, "ADVERTISED_HOST", String),
    (NODE_ID, "NODE_ID", u64),
    (BOOTSTRAP_PEER, "BOOTSTRAP_PEER", String),
    (STABILIZE_INTERVAL_MS, "STABILIZE_INTERVAL_MS", u64),
    (FIX_FINGERS_INTERVAL_MS, "FIX_FINGERS_INTERVAL_MS", u64),
    (REQUEST_TIMEOUT_MS, "REQUEST_TIMEOUT_MS", u64),
    (MAX_LOOKUP_HOPS, "MAX_LOOKUP_HOPS", usize),
);
