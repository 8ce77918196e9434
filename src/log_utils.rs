pub use log::debug;

/// Print a debug message if either the global debug log level or a local debug flag is set
///
/// The local flag is given as the first argument. When it is set, the message is written
/// directly to stderr regardless of log level, which is useful to trace a single component or
/// fusion event.
///
/// # Examples
///
/// ```
/// debug_msg!(false, "Isolating fusion {}", x); // logged only if the global --debug flag is given
/// debug_msg!(true, "Isolating fusion {}", x); // written directly to stderr
/// ```
macro_rules! debug_msg {
    ($flag:expr, $($arg:tt)+) => {
        if $flag {
            eprintln!($($arg)+);
        } else {
            $crate::log_utils::debug!($($arg)+);
        }
    }
}

pub(crate) use debug_msg;
