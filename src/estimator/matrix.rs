use std::ops::{Add, Mul, Sub};

/// Row-major 2x2 matrix.
#[derive(Clone, Copy, PartialEq)]
pub struct Matrix {
    data: [f64; 4],
}

#[derive(Clone, Copy, PartialEq)]
pub struct Vector {
    data: [f64; 2],
}

impl Matrix {
    pub const UNIT: Matrix = Matrix {
        data: [1., 0., 0., 1.],
    };

    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Matrix {
        Matrix { data: [a, b, c, d] }
    }

    pub fn transpose(self) -> Matrix {
        Matrix {
            data: [self.data[0], self.data[2], self.data[1], self.data[3]],
        }
    }

    pub fn scale(self, factor: f64) -> Matrix {
        Matrix {
            data: self.data.map(|x| x * factor),
        }
    }

    pub fn entry(&self, i: usize, j: usize) -> f64 {
        assert!(i < 2 && j < 2);
        self.data[2 * i + j]
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }
}

impl std::fmt::Debug for Matrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "Matrix((({:?},{:?}),({:?},{:?})))",
            self.data[0], self.data[1], self.data[2], self.data[3]
        ))
    }
}

impl Vector {
    pub fn new(a: f64, b: f64) -> Vector {
        Vector { data: [a, b] }
    }

    pub fn entry(&self, i: usize) -> f64 {
        self.data[i]
    }
}

impl std::fmt::Debug for Vector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "Vector(({:?},{:?}))",
            self.data[0], self.data[1]
        ))
    }
}

impl Mul<Matrix> for Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Self) -> Self::Output {
        Matrix {
            data: [
                self.data[0] * rhs.data[0] + self.data[1] * rhs.data[2],
                self.data[0] * rhs.data[1] + self.data[1] * rhs.data[3],
                self.data[2] * rhs.data[0] + self.data[3] * rhs.data[2],
                self.data[2] * rhs.data[1] + self.data[3] * rhs.data[3],
            ],
        }
    }
}

impl Mul<Vector> for Matrix {
    type Output = Vector;

    fn mul(self, rhs: Vector) -> Self::Output {
        Vector {
            data: [
                self.data[0] * rhs.data[0] + self.data[1] * rhs.data[1],
                self.data[2] * rhs.data[0] + self.data[3] * rhs.data[1],
            ],
        }
    }
}

impl Add for Matrix {
    type Output = Matrix;

    fn add(self, rhs: Self) -> Self::Output {
        Matrix {
            data: [
                self.data[0] + rhs.data[0],
                self.data[1] + rhs.data[1],
                self.data[2] + rhs.data[2],
                self.data[3] + rhs.data[3],
            ],
        }
    }
}

impl Sub for Matrix {
    type Output = Matrix;

    fn sub(self, rhs: Self) -> Self::Output {
        Matrix {
            data: [
                self.data[0] - rhs.data[0],
                self.data[1] - rhs.data[1],
                self.data[2] - rhs.data[2],
                self.data[3] - rhs.data[3],
            ],
        }
    }
}
