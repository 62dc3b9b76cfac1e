use bidiag::{
    lapack::{gebrd, gebrd_work_size},
    linalg::bidiag::{bidiag_in_place, bidiag_in_place_req, compute_plan, BidiagParams},
    ComplexField, Mat, Parallelism, RealField,
};
use diol::prelude::*;
use dyn_stack::{GlobalPodBuffer, PodStack};
use rand::prelude::*;
use reborrow::*;

fn random_mat<E: ComplexField>(rng: &mut StdRng, nrows: usize, ncols: usize) -> Mat<E> {
    Mat::from_fn(nrows, ncols, |_, _| {
        E::from_parts(
            E::Real::from_f64(rng.gen::<f64>() - 0.5),
            E::Real::from_f64(rng.gen::<f64>() - 0.5),
        )
    })
}

fn native<E: ComplexField>(bencher: Bencher, PlotArg(n): PlotArg) {
    let rng = &mut StdRng::seed_from_u64(0);
    let mat = random_mat::<E>(rng, n, n);
    let plan = compute_plan(n, n, None, &BidiagParams::default());

    let mut copy = mat.clone();
    let mut d = vec![E::Real::zero(); n];
    let mut e = vec![E::Real::zero(); n.saturating_sub(1)];
    let mut tauq = vec![E::zero(); n];
    let mut taup = vec![E::zero(); n];
    let mut mem = GlobalPodBuffer::new(bidiag_in_place_req::<E>(n, n, &plan).unwrap());
    let mut stack = PodStack::new(&mut mem);

    bencher.bench(|| {
        copy.as_mut().copy_from(mat.as_ref());
        bidiag_in_place(
            copy.as_mut(),
            &mut d,
            &mut e,
            &mut tauq,
            &mut taup,
            &plan,
            Parallelism::None,
            stack.rb_mut(),
        );
    })
}

fn unblocked<E: ComplexField>(bencher: Bencher, PlotArg(n): PlotArg) {
    let rng = &mut StdRng::seed_from_u64(0);
    let mat = random_mat::<E>(rng, n, n);
    // a workspace of max(m, n) disables blocking
    let plan = compute_plan(n, n, Some(n), &BidiagParams::default());

    let mut copy = mat.clone();
    let mut d = vec![E::Real::zero(); n];
    let mut e = vec![E::Real::zero(); n.saturating_sub(1)];
    let mut tauq = vec![E::zero(); n];
    let mut taup = vec![E::zero(); n];
    let mut mem = GlobalPodBuffer::new(bidiag_in_place_req::<E>(n, n, &plan).unwrap());
    let mut stack = PodStack::new(&mut mem);

    bencher.bench(|| {
        copy.as_mut().copy_from(mat.as_ref());
        bidiag_in_place(
            copy.as_mut(),
            &mut d,
            &mut e,
            &mut tauq,
            &mut taup,
            &plan,
            Parallelism::None,
            stack.rb_mut(),
        );
    })
}

fn lapack<E: ComplexField>(bencher: Bencher, PlotArg(n): PlotArg) {
    let rng = &mut StdRng::seed_from_u64(0);
    let mat = random_mat::<E>(rng, n, n);
    let params = BidiagParams::default();
    let lwork = gebrd_work_size::<E, _>(n as isize, n as isize, n as isize, &params).unwrap();

    let mut a = mat.as_slice().to_vec();
    let mut d = vec![E::Real::zero(); n];
    let mut e = vec![E::Real::zero(); n.saturating_sub(1)];
    let mut tauq = vec![E::zero(); n];
    let mut taup = vec![E::zero(); n];
    let mut work = vec![E::zero(); lwork];

    bencher.bench(|| {
        a.copy_from_slice(mat.as_slice());
        gebrd(
            n as isize,
            n as isize,
            &mut a,
            n as isize,
            &mut d,
            &mut e,
            &mut tauq,
            &mut taup,
            &mut work,
            &params,
        )
        .unwrap();
    })
}

fn main() -> std::io::Result<()> {
    let mut bench = Bench::new(BenchConfig::from_args()?);
    let args = [32, 64, 128, 256, 512, 1024].map(PlotArg);
    bench.register_many(list![native::<f32>, unblocked::<f32>, lapack::<f32>], args);
    bench.register_many(list![native::<f64>, unblocked::<f64>, lapack::<f64>], args);
    bench.register_many(
        list![native::<bidiag::c64>, unblocked::<bidiag::c64>, lapack::<bidiag::c64>],
        args,
    );
    bench.run()?;

    Ok(())
}
