use crate::base::neterror::NetError;
use std::io;
use std::path::Path;

#[test]
fn test_net_error_codes() {
    assert_eq!(NetError::InvalidUrl("x".into()).as_i32(), -300);
    assert_eq!(NetError::ConnectionFailed("refused".into()).as_i32(), -104);
    assert_eq!(NetError::MissingBoundary.as_i32(), -332);
}

#[test]
fn test_transport_classification() {
    let io = NetError::file_io(Path::new("a"), io::Error::from(io::ErrorKind::NotFound));
    assert!(io.is_transport());
    assert!(NetError::SourceConsumed.is_transport());
    assert!(!NetError::InvalidMultipart("no headers").is_transport());
    assert!(!NetError::ContentMismatch {
        expected: "json",
        found: "image"
    }
    .is_transport());
}

#[test]
fn test_custom_codes_out_of_standard_range() {
    // Standard net error codes stay above -1000
    let custom = [
        NetError::InvalidDate("x".into()),
        NetError::NotMocked {
            method: "GET".into(),
            url: "http://a".into(),
        },
        NetError::BlockingTaskFailed("cancelled".into()),
    ];
    for err in custom {
        assert!(err.as_i32() <= -1000);
    }
}
