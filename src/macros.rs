//===========================================================================//

macro_rules! invalid_data {
    ($e:expr) => {
        return Err($crate::error::Error::InvalidData(($e).to_string()))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::error::Error::InvalidData(format!($fmt, $($arg)+)))
    };
}

macro_rules! invalid_input {
    ($e:expr) => {
        return Err($crate::error::Error::InvalidInput(($e).to_string()))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::error::Error::InvalidInput(format!($fmt, $($arg)+)))
    };
}

macro_rules! malformed_entry {
    ($index:expr, $e:expr) => {
        return Err($crate::error::Error::MalformedEntry {
            index: $index,
            reason: ($e).to_string(),
        })
    };
    ($index:expr, $fmt:expr, $($arg:tt)+) => {
        return Err($crate::error::Error::MalformedEntry {
            index: $index,
            reason: format!($fmt, $($arg)+),
        })
    };
}

//===========================================================================//
