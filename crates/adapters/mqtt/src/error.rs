//! MQTT adapter error types.

use std::path::PathBuf;

use gpioswitch_domain::error::GpioSwitchError;

/// Errors specific to the MQTT adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// Two switches map to the same topic.
    #[error("topic {0:?} is assigned to more than one switch")]
    DuplicateTopic(String),

    /// The credentials file could not be read or written.
    #[error("failed to access credentials file {path}")]
    CredentialsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The credentials file does not start with a username line.
    #[error("credentials file {path} has no username")]
    MalformedCredentials { path: PathBuf },

    /// A domain-level error.
    #[error("domain error")]
    Domain(#[source] GpioSwitchError),
}

impl MqttError {
    /// Convert into a [`GpioSwitchError::Transport`] for propagation across
    /// port boundaries.
    #[must_use]
    pub fn into_domain(self) -> GpioSwitchError {
        match self {
            Self::Domain(err) => err,
            other => GpioSwitchError::Transport(Box::new(other)),
        }
    }
}

impl From<MqttError> for GpioSwitchError {
    fn from(err: MqttError) -> Self {
        err.into_domain()
    }
}

#[cfg(test)]
mod tests {
    use gpioswitch_domain::error::ValidationError;

    use super::*;

    #[test]
    fn should_display_duplicate_topic_error() {
        let err = MqttError::DuplicateTopic("gpio/17".to_string());
        assert_eq!(
            err.to_string(),
            "topic \"gpio/17\" is assigned to more than one switch"
        );
    }

    #[test]
    fn should_display_malformed_credentials_error() {
        let err = MqttError::MalformedCredentials {
            path: PathBuf::from("/home/pi/.mqtt_auth"),
        };
        assert_eq!(
            err.to_string(),
            "credentials file /home/pi/.mqtt_auth has no username"
        );
    }

    #[test]
    fn should_convert_duplicate_topic_to_transport_error() {
        let err: GpioSwitchError = MqttError::DuplicateTopic("a".to_string()).into();
        assert!(matches!(err, GpioSwitchError::Transport(_)));
    }

    #[test]
    fn should_convert_domain_error_back_to_domain() {
        let mqtt_err = MqttError::Domain(ValidationError::NoSwitches.into());
        let back: GpioSwitchError = mqtt_err.into();
        assert!(matches!(back, GpioSwitchError::Validation(_)));
    }
}
