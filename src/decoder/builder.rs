use super::Decoder;
use crate::{
    emissions::DEFAULT_SLIP_PROBABILITY, error::BuildError,
    transitions::{is_log_probability, DEFAULT_UNSEEN_LOG_PROBABILITY},
    Emissions, Order, Transitions,
};
use ::std::path::PathBuf;

#[derive(Clone, Debug)]
enum TransitionsSource {
    Unseen,
    Path(PathBuf),
    Loaded(Transitions),
}

#[derive(Clone, Debug)]
pub struct DecoderBuilder {
    order: Order,
    source: TransitionsSource,
    unseen_transition: f64,
    slip_probability: f64,
}

impl DecoderBuilder {
    /// Without probabilities every transition has the unseen value.
    #[inline]
    pub fn new(order: Order) -> Self {
        Self {
            order,
            source: TransitionsSource::Unseen,
            unseen_transition: DEFAULT_UNSEEN_LOG_PROBABILITY,
            slip_probability: DEFAULT_SLIP_PROBABILITY,
        }
    }

    /// Probabilities file, read by [`DecoderBuilder::build`]
    #[inline]
    pub fn probabilities(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = TransitionsSource::Path(path.into());
        self
    }

    /// Already loaded transitions, their order replaces the builder's one
    #[inline]
    pub fn transitions(mut self, transitions: Transitions) -> Self {
        self.order = transitions.order();
        self.source = TransitionsSource::Loaded(transitions);
        self
    }

    /// Log-probability of the transitions missing from the probabilities file,
    /// must be in `-inf..=0`. Has no effect on already loaded transitions.
    #[inline]
    pub fn unseen_transition(mut self, log_probability: f64) -> Self {
        self.unseen_transition = log_probability;
        self
    }

    /// Probability of hitting one particular neighbour instead of the intended key
    #[inline]
    pub fn slip_probability(mut self, probability: f64) -> Self {
        self.slip_probability = probability;
        self
    }

    pub fn build(self) -> Result<Decoder, BuildError> {
        if !is_log_probability(self.unseen_transition) {
            return Err(BuildError::UnseenTransition(self.unseen_transition));
        }
        let emissions = Emissions::new(self.slip_probability)?;
        let transitions = match self.source {
            TransitionsSource::Unseen => Transitions::new(self.order, self.unseen_transition),
            TransitionsSource::Path(path) => {
                Transitions::from_path(self.order, path, self.unseen_transition)?
            }
            TransitionsSource::Loaded(transitions) => transitions,
        };

        tracing::debug!(
            order = ?self.order,
            slip_probability = self.slip_probability,
            "decoder built"
        );

        Ok(Decoder::from_parts(transitions, emissions))
    }
}

#[cfg(test)]
mod tests {
    use super::DecoderBuilder;
    use crate::{error::BuildError, error::LoadError, Key, Order, Transitions};
    use rstest::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let decoder = DecoderBuilder::new(Order::Tri).build().unwrap();
        assert_eq!(decoder.order(), Order::Tri);
        assert_eq!(decoder.emissions().slip_probability(), 0.1);
        assert_eq!(
            decoder.transitions(),
            &Transitions::new(Order::Tri, 0.0)
        );
    }

    #[test]
    fn test_unseen_transition() {
        let decoder = DecoderBuilder::new(Order::Bi)
            .unseen_transition(f64::NEG_INFINITY)
            .build()
            .unwrap();
        assert_eq!(
            decoder.transitions().get(&[Key::A], Key::B),
            f64::NEG_INFINITY
        );
    }

    #[test]
    fn test_transitions_replace_order() {
        let decoder = DecoderBuilder::new(Order::Bi)
            .transitions(Transitions::new(Order::Tri, -1.0))
            .build()
            .unwrap();
        assert_eq!(decoder.order(), Order::Tri);
    }

    #[test]
    fn test_probabilities() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "27 27 0 -0.5").unwrap();

        let decoder = DecoderBuilder::new(Order::Tri)
            .probabilities(file.path())
            .unseen_transition(-20.0)
            .build()
            .unwrap();
        let transitions = decoder.transitions();
        assert_eq!(transitions.get(&[Key::Boundary, Key::Boundary], Key::A), -0.5);
        assert_eq!(transitions.get(&[Key::Boundary, Key::Boundary], Key::B), -20.0);
    }

    #[test]
    fn test_malformed_probabilities() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "27 0 -0.5").unwrap();
        writeln!(file, "27 0").unwrap();

        let err = DecoderBuilder::new(Order::Bi)
            .probabilities(file.path())
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::Load(LoadError::FieldCount { line: 2, .. })
        ));
    }

    #[test]
    fn test_invalid_slip_probability() {
        let err = DecoderBuilder::new(Order::Bi)
            .slip_probability(2.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, BuildError::SlipProbability(p) if p == 2.0));
    }

    #[rstest(
        unseen,
        case(f64::NAN),
        case(f64::INFINITY),
        case(0.5),
        case(f64::MIN_POSITIVE)
    )]
    fn test_invalid_unseen_transition(unseen: f64) {
        for order in [Order::Bi, Order::Tri] {
            let err = DecoderBuilder::new(order)
                .unseen_transition(unseen)
                .build()
                .unwrap_err();
            assert!(matches!(
                err,
                BuildError::UnseenTransition(u) if u.to_bits() == unseen.to_bits()
            ));
        }
    }

    #[rstest(unseen, case(0.0), case(-0.0), case(-30.0), case(f64::NEG_INFINITY))]
    fn test_valid_unseen_transition(unseen: f64) {
        let decoder = DecoderBuilder::new(Order::Bi)
            .unseen_transition(unseen)
            .build()
            .unwrap();
        assert_eq!(decoder.transitions().get(&[Key::Z], Key::Q), unseen);
    }
}
