/*!
# Zeitgeist API documentation

This page describes the API endpoints available on Zeitgeist.

All trend endpoints answer with JSON. Successful responses wrap the provider's
data in an envelope that echoes the request. The shape of `data` is whatever
the provider returned, and is not interpreted by Zeitgeist.

Failed requests answer with `{"error": "<message>"}`:

- `400` when a required parameter is missing or empty, or a batch body can't
  be used. The message says what was missing.
- `500` when the provider can't be reached, refuses the request, or answers
  with something that isn't JSON. The message names the kind of data, such as
  `Error fetching daily trends data`, and nothing about the cause.

Nothing is cached. Every request makes fresh calls to the provider.

## Defaults

- `geo` defaults to `US`. An empty `geo` counts as missing. Envelopes echo
  the region used, after this default.
- `startTime` defaults to one calendar month before now, in UTC. It accepts
  RFC 3339 timestamps (`2024-05-01T12:00:00Z`) and calendar dates
  (`2024-05-01`). A value that is neither fails the request with a `500`.
- Daily trends are always for yesterday, in UTC.

## Trends

- `GET /trends/autocomplete?term=<term>` returns `{term, data}`. `keyword`
  is accepted in place of `term`.
- `GET /trends/daily?geo=<geo>` returns `{geo, data}`.
- `GET /trends/interestOverTime?keyword=<keyword>&startTime=<start>` returns
  `{keyword, data}`.
- `GET /trends/interestByRegion?keyword=<keyword>&geo=<geo>&startTime=<start>`
  returns `{keyword, geo, data}`.
- `GET /trends/realTime?geo=<geo>` returns `{geo, data}`.
- `GET /trends/relatedQueries?keyword=<keyword>` returns `{keyword, data}`.
- `GET /trends/relatedTopics?keyword=<keyword>` returns `{keyword, data}`.

### Batches

`POST /trends/batch` with a JSON body:

```json
{"keywords": ["rust", "go"], "startTime": "2024-01-01"}
```

Interest over time is fetched for each keyword, with the same `startTime`.
The response has one entry per keyword, in the order sent. A keyword that
fails gets an `error` instead of `data`, and does not fail the request:

```json
{"results": [
  {"keyword": "rust", "data": {}},
  {"keyword": "go", "error": "Error fetching interest over time data"}
]}
```

## Older routes

These routes answer like their counterparts above.

- `GET /api/v1/autocomplete?keyword=<term>` (`term` is also accepted)
- `GET /api/v1/daily-trends?geo=<geo>`
- `GET /api/v1/interest-over-time?keyword=<keyword>&startTime=<start>`
- `GET /api/v1/related-queries?keyword=<keyword>`
- `POST /api/v1/batch-trends`

## Dockerflow

Zeitgeist follows the [Dockerflow](https://github.com/mozilla-services/Dockerflow)
conventions.

- `/__lbheartbeat__` answers an empty `200` as long as the server is up.
- `/__heartbeat__` answers the version and the name of the trend provider.
- `/__version__` answers the build information in `version.json`.
- `/__error__` always fails, to check that errors are reported.
*/
