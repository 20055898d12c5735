/// Implements the arithmetic operator traits for single-field newtypes, e.g. `op!(binary Gold, Add, add)`.
#[macro_export]
macro_rules! op {
    (binary $t:ty, $imp:ident, $method:ident) => {
        impl std::ops::$imp for $t {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self::Output {
                Self(std::ops::$imp::$method(self.0, rhs.0))
            }
        }
    };
    (inplace $t:ty, $imp:ident, $method:ident) => {
        impl std::ops::$imp for $t {
            fn $method(&mut self, rhs: Self) {
                std::ops::$imp::$method(&mut self.0, rhs.0)
            }
        }
    };
    (unary $t:ty, $imp:ident, $method:ident) => {
        impl std::ops::$imp for $t {
            type Output = Self;

            fn $method(self) -> Self::Output {
                Self(std::ops::$imp::$method(self.0))
            }
        }
    };
}
