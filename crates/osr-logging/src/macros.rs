//! ---
//! osr_section: "03-logging"
//! osr_subsection: "module"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Structured logging context and helpers."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
/// Emit an informational log enriched with result-file context.
#[macro_export]
macro_rules! osr_info {
    (context = $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            tracing::Level::INFO,
            test = ctx.test.unwrap_or(""),
            version = ctx.version.unwrap_or(""),
            tag = ctx.tag.unwrap_or(""),
            command = ctx.command.unwrap_or(""),
            message = %format_args!($($arg)+)
        );
    }};
    ($($arg:tt)+) => {{
        $crate::osr_info!(context = $crate::LogContext::default(), $($arg)+)
    }};
}

/// Emit a warning enriched with result-file context.
#[macro_export]
macro_rules! osr_warn {
    (context = $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            tracing::Level::WARN,
            test = ctx.test.unwrap_or(""),
            version = ctx.version.unwrap_or(""),
            tag = ctx.tag.unwrap_or(""),
            command = ctx.command.unwrap_or(""),
            message = %format_args!($($arg)+)
        );
    }};
    ($($arg:tt)+) => {{
        $crate::osr_warn!(context = $crate::LogContext::default(), $($arg)+)
    }};
}

/// Emit a debug log enriched with result-file context.
#[macro_export]
macro_rules! osr_debug {
    (context = $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            tracing::Level::DEBUG,
            test = ctx.test.unwrap_or(""),
            version = ctx.version.unwrap_or(""),
            tag = ctx.tag.unwrap_or(""),
            command = ctx.command.unwrap_or(""),
            message = %format_args!($($arg)+)
        );
    }};
    ($($arg:tt)+) => {{
        $crate::osr_debug!(context = $crate::LogContext::default(), $($arg)+)
    }};
}
