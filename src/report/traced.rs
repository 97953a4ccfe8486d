//! Errors that remember where they travelled.

use std::error::Error;
use std::fmt;
use std::panic::Location;

/// A single call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub file: &'static str,
    pub line: u32,
}

impl Frame {
    fn from_location(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Capability of an error to enumerate its call frames, innermost first.
pub trait StackTrace {
    fn stack_trace(&self) -> &[Frame];
}

/// Error carrying the call sites it was created at and propagated through.
#[derive(Debug)]
pub struct TracedError {
    message: String,
    frames: Vec<Frame>,
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

impl TracedError {
    /// Create an error, recording the caller as the first frame.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            frames: vec![Frame::from_location(Location::caller())],
            source: None,
        }
    }

    /// Wrap an existing error, recording the caller as the first frame.
    #[track_caller]
    pub fn wrap<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            message: err.to_string(),
            frames: vec![Frame::from_location(Location::caller())],
            source: Some(Box::new(err)),
        }
    }

    /// Record the caller as another frame.
    #[track_caller]
    pub fn traced(mut self) -> Self {
        self.frames.push(Frame::from_location(Location::caller()));
        self
    }
}

impl fmt::Display for TracedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for TracedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn Error + 'static))
    }
}

impl StackTrace for TracedError {
    fn stack_trace(&self) -> &[Frame] {
        &self.frames
    }
}

/// Propagate a [`TracedError`] with `?` while recording each hop.
pub trait ResultExt<T> {
    fn traced(self) -> Result<T, TracedError>;
}

impl<T> ResultExt<T> for Result<T, TracedError> {
    #[track_caller]
    fn traced(self) -> Result<T, TracedError> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(e.traced()),
        }
    }
}

/// Find the first error in the source chain that exposes call frames.
pub fn find_stack_trace<'a>(err: &'a (dyn Error + 'static)) -> Option<&'a [Frame]> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(traced) = e.downcast_ref::<TracedError>() {
            return Some(traced.stack_trace());
        }
        current = e.source();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fn1() -> Result<(), TracedError> {
        fn2().traced()
    }

    fn fn2() -> Result<(), TracedError> {
        fn3().traced()
    }

    fn fn3() -> Result<(), TracedError> {
        Err(TracedError::new("test error2"))
    }

    #[test]
    fn test_frames_follow_propagation() {
        let err = fn1().unwrap_err();
        let frames = err.stack_trace();
        assert_eq!(frames.len(), 3);
        assert!(frames.iter().all(|f| f.file.ends_with("traced.rs")));
        // created in fn3, then fn2, then fn1
        assert!(frames[0].line > frames[1].line);
        assert!(frames[1].line > frames[2].line);
    }

    #[test]
    fn test_wrap_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = TracedError::wrap(io);
        assert_eq!(err.to_string(), "missing");
        assert!(err.source().is_some());
        assert_eq!(err.stack_trace().len(), 1);
    }

    #[derive(Debug)]
    struct Outer(TracedError);

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "outer: {}", self.0)
        }
    }

    impl Error for Outer {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_find_in_source_chain() {
        let err = Outer(TracedError::new("inner"));
        let frames = find_stack_trace(&err).unwrap();
        assert_eq!(frames.len(), 1);

        let plain = std::io::Error::new(std::io::ErrorKind::Other, "plain");
        assert!(find_stack_trace(&plain).is_none());
    }
}
