//! Human-readable annotation of abnormal exit codes.

const UNIX_SIGNALS: &[(i32, &str)] = &[
    (-4, "SIGILL: illegal instruction"),
    (-6, "SIGABRT: aborted"),
    (-7, "SIGBUS: bus error"),
    (-8, "SIGFPE: floating-point exception"),
    (-9, "SIGKILL: killed"),
    (-11, "SIGSEGV: segmentation fault"),
    (-13, "SIGPIPE: broken pipe"),
    (-15, "SIGTERM: terminated"),
];

const WINDOWS_EXCEPTIONS: &[(i32, &str)] = &[
    (3, "abort"),
    (0x8000_0003_u32 as i32, "breakpoint"),
    (0xC000_0005_u32 as i32, "access violation"),
    (0xC000_008E_u32 as i32, "float divide by zero"),
    (0xC000_0094_u32 as i32, "integer divide by zero"),
    (0xC000_00FD_u32 as i32, "stack overflow"),
];

pub fn signal_name(code: i32) -> Option<&'static str> {
    let table = if cfg!(windows) {
        WINDOWS_EXCEPTIONS
    } else {
        UNIX_SIGNALS
    };
    table
        .iter()
        .find(|&&(c, _)| c == code)
        .map(|&(_, name)| name)
}

pub fn describe_exit_code(code: i32) -> String {
    match self::signal_name(code) {
        Some(name) => format!("exit code {} ({})", code, name),
        None => format!("exit code {}", code),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn plain_exit_code() {
        assert_eq!(describe_exit_code(42), "exit code 42");
    }

    #[cfg(unix)]
    #[test]
    fn negated_signal_is_named() {
        assert_eq!(
            describe_exit_code(-11),
            "exit code -11 (SIGSEGV: segmentation fault)"
        );
        assert_eq!(signal_name(-6), Some("SIGABRT: aborted"));
        assert_eq!(signal_name(-100), None);
    }
}
