//! Activation and loss functions used by the graph network.
//!
//! Every hidden and output neuron uses Leaky ReLU. The derivative is taken on
//! the post-activation value, which is exact for Leaky ReLU because the sign
//! of the input is preserved.

/// Slope applied to non-positive inputs.
pub const LEAKY_RELU_SLOPE: f64 = 0.01;

/// `x` for positive input, `0.01 * x` otherwise.
pub fn leaky_relu(x: f64) -> f64 {
    if x > 0.0 {
        x
    } else {
        x * LEAKY_RELU_SLOPE
    }
}

/// Derivative of [`leaky_relu`] evaluated on an activation value.
pub fn leaky_relu_derivative(activation: f64) -> f64 {
    if activation > 0.0 {
        1.0
    } else {
        LEAKY_RELU_SLOPE
    }
}

/// Squared error `(target - actual)^2`.
pub fn squared_error(target: f64, actual: f64) -> f64 {
    (target - actual).powi(2)
}

/// Derivative of [`squared_error`] with respect to `actual`.
pub fn squared_error_derivative(actual: f64, target: f64) -> f64 {
    2.0 * (actual - target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaky_relu() {
        assert_eq!(leaky_relu(2.5), 2.5);
        assert_eq!(leaky_relu(0.0), 0.0);
        assert!((leaky_relu(-3.0) - (-0.03)).abs() < 1e-12);
    }

    #[test]
    fn test_leaky_relu_derivative() {
        assert_eq!(leaky_relu_derivative(0.7), 1.0);
        assert_eq!(leaky_relu_derivative(0.0), LEAKY_RELU_SLOPE);
        assert_eq!(leaky_relu_derivative(-0.2), LEAKY_RELU_SLOPE);
    }

    #[test]
    fn test_squared_error() {
        assert_eq!(squared_error(3.0, 1.0), 4.0);
        assert_eq!(squared_error_derivative(1.0, 3.0), -4.0);
    }
}
