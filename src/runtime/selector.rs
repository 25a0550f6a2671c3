use crate::Scalar;
use crate::channel::{CancelToken, Stream, StreamError};
use crossbeam_channel::Select;

/// Receives exactly one value from every stream in `inputs`.
///
/// Values are taken in whatever order the writers become ready and stored by
/// input position. A stream is dropped from the selection as soon as it has
/// delivered, so no input is read twice in the same round.
pub(crate) fn recv_each(
    inputs: &[Stream],
    cancel: &CancelToken,
) -> Result<Vec<Scalar>, StreamError> {
    let mut values = vec![Scalar::default(); inputs.len()];
    recv_each_with(inputs, cancel, |index, value| values[index] = value)?;
    Ok(values)
}

/// Same round as [`recv_each`], handing each value to `deliver` together with
/// its input position, in the order the inputs were serviced. When several
/// writers are ready at once the next one is picked at random.
pub(crate) fn recv_each_with<F>(
    inputs: &[Stream],
    cancel: &CancelToken,
    mut deliver: F,
) -> Result<(), StreamError>
where
    F: FnMut(usize, Scalar),
{
    let mut select = Select::new();
    for input in inputs {
        select.recv(input.receiver());
    }
    let cancelled = select.recv(cancel.signal());

    for _ in 0..inputs.len() {
        let oper = select.select();
        let index = oper.index();
        if index == cancelled {
            let _ = oper.recv(cancel.signal());
            return Err(StreamError::Cancelled);
        }

        let value = oper
            .recv(inputs[index].receiver())
            .map_err(|_| StreamError::Disconnected)?;
        deliver(index, value);
        select.remove(index);
    }

    Ok(())
}

/// Delivers `value` once to every stream in `outputs`.
///
/// Returns only after every reader has taken the value.
pub(crate) fn send_each(
    outputs: &[Stream],
    value: Scalar,
    cancel: &CancelToken,
) -> Result<(), StreamError> {
    let mut select = Select::new();
    for output in outputs {
        select.send(output.sender());
    }
    let cancelled = select.recv(cancel.signal());

    for _ in 0..outputs.len() {
        let oper = select.select();
        let index = oper.index();
        if index == cancelled {
            let _ = oper.recv(cancel.signal());
            return Err(StreamError::Cancelled);
        }

        oper.send(outputs[index].sender(), value)
            .map_err(|_| StreamError::Disconnected)?;
        select.remove(index);
    }

    Ok(())
}
