/// Square height grid, row-major `[z][x]`, values normalized to the terrain's height range.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightRaster {
    res: usize,
    data: Vec<f32>,
}

impl HeightRaster {
    pub fn new(res: usize) -> Self {
        Self {
            res,
            data: vec![0.0; res * res],
        }
    }

    /// `None` unless `data.len() == res * res`.
    pub fn from_vec(res: usize, data: Vec<f32>) -> Option<Self> {
        (data.len() == res * res).then_some(Self { res, data })
    }

    #[inline]
    pub fn res(&self) -> usize {
        self.res
    }

    #[inline]
    fn idx(&self, x: usize, z: usize) -> usize {
        z * self.res + x
    }

    #[inline]
    pub fn get(&self, x: usize, z: usize) -> f32 {
        self.data[self.idx(x, z)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, z: usize, v: f32) {
        let i = self.idx(x, z);
        self.data[i] = v;
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Bilinear sample at fractional pixel coordinates, clamped to the grid.
    pub fn sample(&self, fx: f32, fz: f32) -> f32 {
        if self.res == 0 {
            return 0.0;
        }
        let max = (self.res - 1) as f32;
        let fx = fx.clamp(0.0, max);
        let fz = fz.clamp(0.0, max);
        let x0 = fx.floor() as usize;
        let z0 = fz.floor() as usize;
        let x1 = (x0 + 1).min(self.res - 1);
        let z1 = (z0 + 1).min(self.res - 1);
        let tx = fx - x0 as f32;
        let tz = fz - z0 as f32;
        let a = self.get(x0, z0) + (self.get(x1, z0) - self.get(x0, z0)) * tx;
        let b = self.get(x0, z1) + (self.get(x1, z1) - self.get(x0, z1)) * tx;
        a + (b - a) * tz
    }
}

/// Per-pixel material weights, `[z][x][layer]`. Every pixel sums to 1.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightRaster {
    width: usize,
    depth: usize,
    layers: usize,
    data: Vec<f32>,
}

impl WeightRaster {
    /// All weight on layer 0.
    pub fn new(width: usize, depth: usize, layers: usize) -> Self {
        let mut data = vec![0.0; width * depth * layers];
        if layers > 0 {
            for px in data.chunks_exact_mut(layers) {
                px[0] = 1.0;
            }
        }
        Self {
            width,
            depth,
            layers,
            data,
        }
    }

    pub fn from_vec(width: usize, depth: usize, layers: usize, data: Vec<f32>) -> Option<Self> {
        (data.len() == width * depth * layers).then_some(Self {
            width,
            depth,
            layers,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn layers(&self) -> usize {
        self.layers
    }

    #[inline]
    fn base(&self, x: usize, z: usize) -> usize {
        (z * self.width + x) * self.layers
    }

    #[inline]
    pub fn pixel(&self, x: usize, z: usize) -> &[f32] {
        let b = self.base(x, z);
        &self.data[b..b + self.layers]
    }

    #[inline]
    pub fn pixel_mut(&mut self, x: usize, z: usize) -> &mut [f32] {
        let b = self.base(x, z);
        &mut self.data[b..b + self.layers]
    }

    pub fn set_one_hot(&mut self, x: usize, z: usize, layer: usize) {
        for (l, w) in self.pixel_mut(x, z).iter_mut().enumerate() {
            *w = if l == layer { 1.0 } else { 0.0 };
        }
    }

    #[inline]
    pub fn sum_at(&self, x: usize, z: usize) -> f32 {
        self.pixel(x, z).iter().sum()
    }
}
