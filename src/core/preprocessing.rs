use crate::utils::error::{AgriError, Result};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// 標準化：平均 0、變異數 1，只用訓練資料擬合
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    pub fn fit(x: ArrayView2<f64>) -> Result<Self> {
        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| AgriError::processing("cannot fit scaler on an empty matrix"))?;
        // 母體標準差；常數欄位維持原尺度
        let scale = x
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s <= f64::EPSILON { 1.0 } else { s });

        Ok(Self { mean, scale })
    }

    pub fn transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.mean.len() {
            return Err(AgriError::processing(format!(
                "scaler was fitted on {} features, got {}",
                self.mean.len(),
                x.ncols()
            )));
        }
        Ok((&x - &self.mean) / &self.scale)
    }

    pub fn fit_transform(x: ArrayView2<f64>) -> Result<(Self, Array2<f64>)> {
        let scaler = Self::fit(x)?;
        let transformed = scaler.transform(x)?;
        Ok((scaler, transformed))
    }
}

/// 訓練 / 測試切分後的列索引
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// 以固定種子打亂後切分，測試集大小為 ceil(n * test_fraction)。
///
/// 只有一列時訓練集會是空的，此時訓練與測試都使用全部資料。
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> Result<SplitIndices> {
    if n == 0 {
        return Err(AgriError::processing("cannot split an empty slice"));
    }
    if !(0.0..1.0).contains(&test_fraction) {
        return Err(AgriError::processing(format!(
            "test fraction {} must be in [0, 1)",
            test_fraction
        )));
    }

    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let n_test = ((n as f64) * test_fraction).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Ok(SplitIndices {
            train: order.clone(),
            test: order,
        });
    }

    let test = order[..n_test].to_vec();
    let train = order[n_test..].to_vec();
    Ok(SplitIndices { train, test })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_scaler_zero_mean_unit_variance() {
        let x = array![[1.0, 5.0], [3.0, 5.0], [5.0, 5.0]];
        let (scaler, scaled) = StandardScaler::fit_transform(x.view()).unwrap();
        let first = scaled.column(0);
        assert!(first.sum().abs() < 1e-12);
        assert!((first.mapv(|v| v * v).sum() / 3.0 - 1.0).abs() < 1e-12);
        // 常數欄位只做平移
        assert!(scaled.column(1).iter().all(|&v| v == 0.0));
        let shifted = scaler.transform(array![[7.0, 6.0]].view()).unwrap();
        assert_eq!(shifted[[0, 1]], 1.0);
    }

    #[test]
    fn test_scaler_rejects_empty_or_wrong_width() {
        let empty = Array2::<f64>::zeros((0, 3));
        assert!(StandardScaler::fit(empty.view()).is_err());

        let scaler = StandardScaler::fit(array![[1.0, 2.0]].view()).unwrap();
        assert!(scaler.transform(array![[1.0, 2.0, 3.0]].view()).is_err());
    }

    #[test]
    fn test_split_sizes_and_determinism() {
        let a = train_test_split(10, 0.2, 42).unwrap();
        let b = train_test_split(10, 0.2, 42).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.test.len(), 2);
        assert_eq!(a.train.len(), 8);

        let mut all: Vec<usize> = a.train.iter().chain(&a.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_rounds_test_size_up() {
        let split = train_test_split(5, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 1);
        assert_eq!(split.train.len(), 4);

        let split = train_test_split(3, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 1);
        assert_eq!(split.train.len(), 2);
    }

    #[test]
    fn test_single_row_uses_whole_slice() {
        let split = train_test_split(1, 0.2, 42).unwrap();
        assert_eq!(split.train, vec![0]);
        assert_eq!(split.test, vec![0]);
    }
}
