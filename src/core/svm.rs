use crate::utils::error::{AgriError, Result};
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvmParams {
    /// 軟間隔懲罰係數
    pub c: f64,
    pub max_iter: usize,
    pub tolerance: f64,
}

impl Default for SvmParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 1000,
            tolerance: 1e-4,
        }
    }
}

/// 兩個類別之間的線性決策函數
#[derive(Debug, Clone, PartialEq)]
struct BinaryMachine {
    positive: usize,
    negative: usize,
    weights: Array1<f64>,
    bias: f64,
}

impl BinaryMachine {
    fn decision(&self, x: ArrayView1<f64>) -> f64 {
        self.weights.dot(&x) + self.bias
    }
}

/// 線性核 SVM 分類器，多類別採 one-vs-one 投票。
///
/// 每個二元子問題以對偶座標下降求解 hinge loss，訓練順序固定，
/// 同樣的輸入永遠得到同樣的模型。
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSvc {
    classes: Vec<usize>,
    width: usize,
    machines: Vec<BinaryMachine>,
}

impl LinearSvc {
    pub fn fit(x: ArrayView2<f64>, y: &[usize], params: SvmParams) -> Result<Self> {
        if x.nrows() == 0 {
            return Err(AgriError::processing("cannot fit classifier on zero rows"));
        }
        if x.nrows() != y.len() {
            return Err(AgriError::processing(format!(
                "feature rows ({}) and labels ({}) differ in length",
                x.nrows(),
                y.len()
            )));
        }

        let classes: Vec<usize> = y.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        let mut machines = Vec::new();

        for (i, &positive) in classes.iter().enumerate() {
            for &negative in &classes[i + 1..] {
                let members: Vec<usize> = y
                    .iter()
                    .enumerate()
                    .filter(|(_, label)| **label == positive || **label == negative)
                    .map(|(row, _)| row)
                    .collect();
                let rows = x.select(Axis(0), &members);
                let signs: Array1<f64> = members
                    .iter()
                    .map(|&row| if y[row] == positive { 1.0 } else { -1.0 })
                    .collect();

                let (weights, bias) = train_binary(rows.view(), signs.view(), params);
                machines.push(BinaryMachine {
                    positive,
                    negative,
                    weights,
                    bias,
                });
            }
        }

        tracing::debug!(
            "Fitted linear SVC: {} classes, {} pairwise machines",
            classes.len(),
            machines.len()
        );
        Ok(Self {
            classes,
            width: x.ncols(),
            machines,
        })
    }

    pub fn classes(&self) -> &[usize] {
        &self.classes
    }

    /// 得票最多的類別；同票時取代碼較小者
    pub fn predict_one(&self, x: ArrayView1<f64>) -> usize {
        if self.machines.is_empty() {
            return self.classes[0];
        }

        let mut votes = vec![0usize; self.classes.len()];
        for machine in &self.machines {
            let winner = if machine.decision(x) > 0.0 {
                machine.positive
            } else {
                machine.negative
            };
            if let Ok(pos) = self.classes.binary_search(&winner) {
                votes[pos] += 1;
            }
        }

        let mut best = 0;
        for (pos, &count) in votes.iter().enumerate() {
            if count > votes[best] {
                best = pos;
            }
        }
        self.classes[best]
    }

    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Vec<usize>> {
        if x.ncols() != self.width {
            return Err(AgriError::processing(format!(
                "model expects {} features, got {}",
                self.width,
                x.ncols()
            )));
        }
        Ok(x.outer_iter().map(|row| self.predict_one(row)).collect())
    }
}

fn train_binary(rows: ArrayView2<f64>, signs: ArrayView1<f64>, params: SvmParams) -> (Array1<f64>, f64) {
    let mut weights = Array1::<f64>::zeros(rows.ncols());
    let mut bias = 0.0;
    let mut alpha = Array1::<f64>::zeros(rows.nrows());
    // 擴增常數 1 之後的 ||x||^2，至少為 1
    let q_diag: Array1<f64> = rows.map_axis(Axis(1), |row| row.dot(&row) + 1.0);

    for iteration in 0..params.max_iter {
        let mut max_violation: f64 = 0.0;

        for (i, row) in rows.outer_iter().enumerate() {
            let gradient = signs[i] * (weights.dot(&row) + bias) - 1.0;

            let projected = if alpha[i] <= 0.0 {
                gradient.min(0.0)
            } else if alpha[i] >= params.c {
                gradient.max(0.0)
            } else {
                gradient
            };
            max_violation = max_violation.max(projected.abs());

            if projected.abs() > 1e-12 {
                let previous = alpha[i];
                alpha[i] = (previous - gradient / q_diag[i]).clamp(0.0, params.c);
                let step = (alpha[i] - previous) * signs[i];
                weights.scaled_add(step, &row);
                bias += step;
            }
        }

        if max_violation < params.tolerance {
            tracing::trace!("Binary SVM converged after {} iterations", iteration + 1);
            break;
        }
    }

    (weights, bias)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_separates_two_linear_clusters() {
        let x = array![
            [-2.0, -1.0],
            [-1.5, -2.0],
            [-1.0, -1.5],
            [1.0, 1.5],
            [1.5, 2.0],
            [2.0, 1.0],
        ];
        let y = vec![0, 0, 0, 1, 1, 1];
        let model = LinearSvc::fit(x.view(), &y, SvmParams::default()).unwrap();

        assert_eq!(model.predict(x.view()).unwrap(), y);
        assert_eq!(model.predict_one(array![-3.0, -3.0].view()), 0);
        assert_eq!(model.predict_one(array![3.0, 3.0].view()), 1);
    }

    #[test]
    fn test_three_classes_one_vs_one() {
        let x = array![
            [0.0, 5.0],
            [0.5, 5.5],
            [5.0, 0.0],
            [5.5, 0.5],
            [-5.0, -5.0],
            [-5.5, -4.5],
        ];
        let y = vec![2, 2, 4, 4, 7, 7];
        let model = LinearSvc::fit(x.view(), &y, SvmParams::default()).unwrap();

        assert_eq!(model.classes(), &[2, 4, 7]);
        assert_eq!(model.predict_one(array![0.2, 6.0].view()), 2);
        assert_eq!(model.predict_one(array![6.0, 0.2].view()), 4);
        assert_eq!(model.predict_one(array![-6.0, -6.0].view()), 7);
    }

    #[test]
    fn test_single_class_always_predicts_it() {
        let x = array![[1.0], [2.0]];
        let model = LinearSvc::fit(x.view(), &[3, 3], SvmParams::default()).unwrap();
        assert_eq!(model.predict_one(array![100.0].view()), 3);
    }

    #[test]
    fn test_rejects_mismatched_shapes() {
        let x = array![[1.0], [2.0]];
        assert!(LinearSvc::fit(x.view(), &[0], SvmParams::default()).is_err());

        let empty = ndarray::Array2::<f64>::zeros((0, 2));
        assert!(LinearSvc::fit(empty.view(), &[], SvmParams::default()).is_err());

        let model = LinearSvc::fit(x.view(), &[0, 1], SvmParams::default()).unwrap();
        assert!(model.predict(array![[1.0, 2.0]].view()).is_err());
    }
}
