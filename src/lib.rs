pub mod configuration;

pub mod engine;

pub mod integration {
    pub mod integrationerror;
    pub mod integrationresult;
    pub mod trapezoidalintegrator;
    pub mod simpsonintegrator;
    pub mod rombergintegrator;
}

pub mod math {
    pub mod curve {
        pub mod curve;
        pub mod analyticcurve;
        pub mod nonparametriccurve {
            pub mod nonparametriccurve;
            pub mod piecewisepolynomial;
        }
    }
    pub mod tridiagonal;
}

pub mod sample {
    pub mod sampleerror;
    pub mod sampleset;
    pub mod samplefile;
}

pub mod validation {
    pub mod validationerror;
    pub mod crossvalidator;
    pub mod referencefile;
}
